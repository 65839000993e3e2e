//! 요청별 세션 해석.
//!
//! `Authorization: Bearer <token>` 헤더에서 토큰을 꺼내 검증하고, 저장소에서 계정을 다시 읽어
//! 불변 [`Identity`] 값을 만듭니다. 이 값은 핸들러와 서비스에 인자로 전달됩니다.
//!
//! 토큰 누락, 위조, 만료, 계정 삭제는 모두 같은 `Unauthenticated`로 끝납니다.
//! 내부적으로는 원인을 구분해 로그와 메트릭에 남깁니다.

use tasker_core::{Account, Role, TaskerError, TaskerResult};
use tracing::debug;
use uuid::Uuid;

use super::jwt::{JwtError, TokenIssuer};
use crate::metrics::record_auth_rejection;
use crate::repository::AccountStore;

/// 해석된 요청자.
///
/// 저장소에서 읽은 계정이 그대로 들어 있으며, 역할도 토큰이 아니라 저장된 값을 따릅니다.
#[derive(Debug, Clone)]
pub struct Identity {
    account: Account,
}

impl Identity {
    pub(crate) fn new(account: Account) -> Self {
        Self { account }
    }

    pub fn account_id(&self) -> Uuid {
        self.account.id
    }

    pub fn role(&self) -> Role {
        self.account.role
    }

    pub fn account(&self) -> &Account {
        &self.account
    }
}

/// 세션 해석 실패 원인 (내부용).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    MissingToken,
    InvalidToken,
    UnknownAccount,
}

impl Rejection {
    fn label(self) -> &'static str {
        match self {
            Rejection::MissingToken => "missing_token",
            Rejection::InvalidToken => "invalid_token",
            Rejection::UnknownAccount => "unknown_account",
        }
    }
}

/// `Bearer ` 접두사를 제거합니다. 토큰이 비어 있으면 `None`.
fn bearer_token(header: Option<&str>) -> Option<&str> {
    header
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn reject(reason: Rejection) -> TaskerError {
    debug!(reason = reason.label(), "세션 해석 실패");
    record_auth_rejection(reason.label());
    TaskerError::Unauthenticated
}

/// Authorization 헤더 값으로 요청자를 해석합니다.
///
/// # Arguments
///
/// * `header` - Authorization 헤더 값 (없으면 `None`)
/// * `tokens` - 토큰 검증기
/// * `accounts` - 계정 저장소
pub async fn resolve(
    header: Option<&str>,
    tokens: &TokenIssuer,
    accounts: &dyn AccountStore,
) -> TaskerResult<Identity> {
    let token = bearer_token(header).ok_or_else(|| reject(Rejection::MissingToken))?;

    let claims = tokens.validate(token).map_err(|e| {
        if matches!(e, JwtError::TokenExpired) {
            debug!("만료된 토큰");
        }
        reject(Rejection::InvalidToken)
    })?;

    let account = accounts
        .find_account_by_id(claims.sub)
        .await
        .map_err(TaskerError::from)?
        .ok_or_else(|| reject(Rejection::UnknownAccount))?;

    Ok(Identity::new(account))
}
