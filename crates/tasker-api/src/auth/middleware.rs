//! Axum용 인증 추출기.
//!
//! 보호된 핸들러는 [`CurrentAccount`] 또는 [`AdminAccount`]를 인자로 받습니다.
//! 해석된 요청자는 요청 객체를 변경하지 않고 값으로 전달됩니다.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tasker_core::Role;

use super::{require_role, session, Identity};
use crate::error::ApiError;
use crate::metrics::record_auth_rejection;
use crate::state::AppState;

/// 인증된 요청자 추출기.
///
/// # 사용 예시
///
/// ```rust,ignore
/// async fn me(CurrentAccount(identity): CurrentAccount) -> impl IntoResponse {
///     Json(identity.account().profile())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentAccount(pub Identity);

impl FromRequestParts<Arc<AppState>> for CurrentAccount {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let identity = session::resolve(header, &state.tokens, state.accounts.as_ref()).await?;
        Ok(CurrentAccount(identity))
    }
}

/// Admin 권한을 요구하는 추출기.
#[derive(Debug, Clone)]
pub struct AdminAccount(pub Identity);

impl FromRequestParts<Arc<AppState>> for AdminAccount {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let CurrentAccount(identity) = CurrentAccount::from_request_parts(parts, state).await?;
        require_role(Role::Admin, &identity).inspect_err(|_| record_auth_rejection("forbidden"))?;
        Ok(AdminAccount(identity))
    }
}
