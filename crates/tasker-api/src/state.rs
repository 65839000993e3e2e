//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 `Arc`로 래핑되어 여러 요청 간에 공유됩니다.
//! 서명 키와 관리자 코드는 시작 시 한 번 로드된 뒤 읽기 전용입니다.
//! 요청 간에 공유되는 가변 상태는 저장소뿐입니다.

use std::sync::Arc;

use tasker_core::AppConfig;

use crate::auth::{AdminCode, TokenIssuer};
use crate::repository::{AccountStore, TaskStore};

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 계정 저장소
    pub accounts: Arc<dyn AccountStore>,

    /// 작업 저장소
    pub tasks: Arc<dyn TaskStore>,

    /// 토큰 발급/검증기
    pub tokens: Arc<TokenIssuer>,

    /// 관리자 등록 코드
    pub admin_code: Arc<AdminCode>,

    /// 서버 시작 시간
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// 애플리케이션 버전
    pub version: String,
}

impl AppState {
    /// 새로운 AppState 생성.
    ///
    /// # 인자
    /// * `accounts` - 계정 저장소
    /// * `tasks` - 작업 저장소
    /// * `tokens` - 토큰 발급기
    /// * `admin_code` - 관리자 등록 코드
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        tasks: Arc<dyn TaskStore>,
        tokens: TokenIssuer,
        admin_code: AdminCode,
    ) -> Self {
        Self {
            accounts,
            tasks,
            tokens: Arc::new(tokens),
            admin_code: Arc::new(admin_code),
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 설정과 저장소로 상태를 구성합니다.
    ///
    /// 같은 저장소 인스턴스가 계정/작업 포트를 모두 구현해야 연쇄 삭제가 원자적입니다.
    pub fn from_config<S>(config: &AppConfig, store: Arc<S>) -> Result<Self, config::ConfigError>
    where
        S: AccountStore + TaskStore + 'static,
    {
        let tokens = TokenIssuer::new(config.jwt_secret()?, config.auth.token_ttl_minutes);
        let admin_code = AdminCode::new(config.auth.admin_code.as_ref());
        Ok(Self::new(store.clone(), store, tokens, admin_code))
    }

    /// 서버 업타임(초) 반환.
    pub fn uptime_secs(&self) -> i64 {
        chrono::Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
    }

    /// 저장소 연결 상태 확인.
    pub async fn is_store_healthy(&self) -> bool {
        self.accounts.ping().await.is_ok()
    }
}

/// 테스트 상태의 서명 키.
#[cfg(any(test, feature = "test-utils"))]
pub const TEST_JWT_SECRET: &str = "test-secret-key-for-jwt-testing-minimum-32-chars";

/// 테스트 상태의 관리자 등록 코드.
#[cfg(any(test, feature = "test-utils"))]
pub const TEST_ADMIN_CODE: &str = "test-admin-code";

/// 테스트용 AppState 생성 헬퍼.
///
/// 실제 DB 연결 없이 인메모리 저장소로 동작합니다.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    use crate::repository::MemoryStore;
    use secrecy::SecretString;

    let store = Arc::new(MemoryStore::new());
    AppState::new(
        store.clone(),
        store,
        TokenIssuer::new(&SecretString::from(TEST_JWT_SECRET), 60),
        AdminCode::new(Some(&SecretString::from(TEST_ADMIN_CODE))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryStore;

    #[tokio::test]
    async fn test_memory_store_is_healthy() {
        let state = create_test_state();
        assert!(state.is_store_healthy().await);
        assert!(state.uptime_secs() >= 0);
        assert!(state.admin_code.is_configured());
    }

    #[test]
    fn test_from_config_requires_secret() {
        let config = AppConfig::default();
        let result = AppState::from_config(&config, Arc::new(MemoryStore::new()));
        assert!(result.is_err());
    }

    #[test]
    fn test_from_config() {
        let config = AppConfig::from_toml_str(
            r#"
            [auth]
            jwt_secret = "from-config-secret-key-minimum-32-chars"
            "#,
        )
        .unwrap();
        let state = AppState::from_config(&config, Arc::new(MemoryStore::new())).unwrap();
        assert!(!state.admin_code.is_configured());
    }
}
