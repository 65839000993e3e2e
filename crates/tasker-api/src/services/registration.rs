//! 계정 등록과 로그인.

use tasker_core::{normalize_email, Account, NewAccount, Role, TaskerError, TaskerResult};
use tracing::{info, warn};

use crate::auth::{hash_password, verify_against_dummy, verify_password};
use crate::metrics::{record_login_failure, record_registration};
use crate::repository::StoreError;
use crate::state::AppState;

/// 중복 이메일 등록 메시지.
pub const EMAIL_REGISTERED: &str = "Email already registered";
/// 관리자 코드 불일치 메시지.
pub const INVALID_ADMIN_CODE: &str = "Invalid admin code";

/// 등록 입력 (형식 검증 완료 상태).
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub admin_code: Option<String>,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// 등록/로그인 결과.
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub account: Account,
    pub token: String,
}

async fn hash_blocking(password: String) -> TaskerResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| TaskerError::Internal(format!("해싱 태스크 실행 실패: {e}")))?
        .map_err(|e| TaskerError::Internal(e.to_string()))
}

fn issue(state: &AppState, account: Account) -> TaskerResult<AuthOutcome> {
    let token = state
        .tokens
        .issue(&account)
        .map_err(|e| TaskerError::Internal(e.to_string()))?;
    Ok(AuthOutcome { account, token })
}

/// 계정을 등록하고 토큰을 발급합니다.
///
/// 관리자 역할 요청은 관리자 코드가 일치해야 하며, 불일치 시 계정을 만들지 않습니다.
/// 이메일 유일성은 저장소의 원자적 삽입으로 판정합니다.
pub async fn register(state: &AppState, input: Registration) -> TaskerResult<AuthOutcome> {
    if input.role.is_admin() && !state.admin_code.matches(input.admin_code.as_deref()) {
        warn!(role = %input.role, "관리자 코드 불일치로 등록 거부");
        return Err(TaskerError::Forbidden(INVALID_ADMIN_CODE.to_string()));
    }

    let password_hash = hash_blocking(input.password).await?;
    let account = state
        .accounts
        .create_account(NewAccount::new(
            &input.name,
            &input.email,
            password_hash,
            input.role,
        ))
        .await
        .map_err(|e| match e {
            StoreError::Conflict(_) => TaskerError::Conflict(EMAIL_REGISTERED.to_string()),
            other => other.into(),
        })?;

    record_registration(account.role.as_str());
    info!(account_id = %account.id, role = %account.role, "계정 등록");
    issue(state, account)
}

/// 이메일/비밀번호로 로그인합니다.
///
/// 이메일이 없을 때도 더미 해시로 검증을 수행하며, 실패 원인과 관계없이 `Unauthenticated`를 반환합니다.
pub async fn login(state: &AppState, email: &str, password: &str) -> TaskerResult<AuthOutcome> {
    let account = state
        .accounts
        .find_account_by_email(&normalize_email(email))
        .await?;

    let stored_hash = account.as_ref().map(|a| a.password_hash.clone());
    let password = password.to_string();
    let verified = tokio::task::spawn_blocking(move || match stored_hash {
        Some(hash) => verify_password(&password, &hash).unwrap_or(false),
        None => verify_against_dummy(&password),
    })
    .await
    .map_err(|e| TaskerError::Internal(format!("검증 태스크 실행 실패: {e}")))?;

    match account {
        Some(account) if verified => {
            info!(account_id = %account.id, role = %account.role, "로그인 성공");
            issue(state, account)
        }
        _ => {
            record_login_failure();
            info!("로그인 실패");
            Err(TaskerError::Unauthenticated)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::session;
    use crate::state::{create_test_state, TEST_ADMIN_CODE};

    fn registration(email: &str, role: Role, admin_code: Option<&str>) -> Registration {
        Registration {
            name: "Tester".to_string(),
            email: email.to_string(),
            password: "secret1".to_string(),
            role,
            admin_code: admin_code.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_register_returns_resolvable_token() {
        let state = create_test_state();
        let outcome = register(&state, registration("A@Example.com", Role::User, None))
            .await
            .unwrap();

        assert_eq!(outcome.account.email, "a@example.com");
        assert_ne!(outcome.account.password_hash, "secret1");

        let header = format!("Bearer {}", outcome.token);
        let identity = session::resolve(Some(header.as_str()), &state.tokens, state.accounts.as_ref())
            .await
            .unwrap();
        assert_eq!(identity.account_id(), outcome.account.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflict() {
        let state = create_test_state();
        register(&state, registration("dup@example.com", Role::User, None))
            .await
            .unwrap();

        let err = register(&state, registration("dup@example.com", Role::User, None))
            .await
            .unwrap_err();
        assert!(matches!(err, TaskerError::Conflict(ref m) if m == EMAIL_REGISTERED));
    }

    #[tokio::test]
    async fn test_admin_requires_code() {
        let state = create_test_state();

        for code in [None, Some("wrong")] {
            let err = register(&state, registration("boss@example.com", Role::Admin, code))
                .await
                .unwrap_err();
            assert!(matches!(err, TaskerError::Forbidden(_)));
        }
        assert!(state.accounts.list_accounts().await.unwrap().is_empty());

        let outcome = register(
            &state,
            registration("boss@example.com", Role::Admin, Some(TEST_ADMIN_CODE)),
        )
        .await
        .unwrap();
        assert_eq!(outcome.account.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_login() {
        let state = create_test_state();
        let registered = register(&state, registration("ada@example.com", Role::User, None))
            .await
            .unwrap();

        let outcome = login(&state, " ADA@example.com", "secret1").await.unwrap();
        assert_eq!(outcome.account.id, registered.account.id);

        let wrong = login(&state, "ada@example.com", "nope").await.unwrap_err();
        let unknown = login(&state, "who@example.com", "secret1").await.unwrap_err();
        assert!(matches!(wrong, TaskerError::Unauthenticated));
        assert!(matches!(unknown, TaskerError::Unauthenticated));
    }
}
