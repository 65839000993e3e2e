//! 계정 endpoint.
//!
//! - `GET/PUT/DELETE /api/users/profile` - 자기 프로필
//! - `DELETE /api/users/{id}` - 관리자 계정 삭제
//! - `GET /api/users/statistics` - 관리자 통계

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;
use tasker_core::{ProfileUpdate, Statistics};
use utoipa::ToSchema;
use validator::Validate;

use super::auth::UserResponse;
use super::extract::{parse_id, validate_email, validate_name, ValidJson};
use super::MessageResponse;
use crate::auth::{AdminAccount, CurrentAccount};
use crate::error::{ApiErrorResponse, ApiResult};
use crate::services::{self, accounts::USER_NOT_FOUND};
use crate::state::AppState;

/// 프로필 수정 요청.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(custom(function = "validate_name"))]
    pub name: Option<String>,
    #[validate(custom(function = "validate_email"))]
    pub email: Option<String>,
}

/// 프로필 수정 응답.
#[derive(Debug, serde::Serialize, ToSchema)]
pub struct ProfileUpdatedResponse {
    pub message: String,
    pub user: tasker_core::AccountProfile,
}

/// 내 프로필 조회.
#[utoipa::path(
    get,
    path = "/api/users/profile",
    responses(
        (status = 200, description = "조회 성공", body = UserResponse),
        (status = 401, description = "인증 실패", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get_profile(CurrentAccount(identity): CurrentAccount) -> Json<UserResponse> {
    Json(UserResponse {
        user: identity.account().profile(),
    })
}

/// 내 프로필 수정.
#[utoipa::path(
    put,
    path = "/api/users/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "수정 성공", body = ProfileUpdatedResponse),
        (status = 400, description = "검증 실패 또는 이메일 중복", body = ApiErrorResponse),
        (status = 401, description = "인증 실패", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    CurrentAccount(identity): CurrentAccount,
    ValidJson(req): ValidJson<UpdateProfileRequest>,
) -> ApiResult<Json<ProfileUpdatedResponse>> {
    let update = ProfileUpdate::new(req.name.as_deref(), req.email.as_deref());
    let account = services::update_profile(&state, &identity, update).await?;
    Ok(Json(ProfileUpdatedResponse {
        message: "Profile updated successfully".to_string(),
        user: account.profile(),
    }))
}

/// 내 계정 삭제 (소유 작업 포함).
#[utoipa::path(
    delete,
    path = "/api/users/profile",
    responses(
        (status = 200, description = "삭제 성공", body = MessageResponse),
        (status = 401, description = "인증 실패", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn delete_profile(
    State(state): State<Arc<AppState>>,
    CurrentAccount(identity): CurrentAccount,
) -> ApiResult<Json<MessageResponse>> {
    services::delete_own_account(&state, &identity).await?;
    Ok(Json(MessageResponse::new("Account deleted successfully")))
}

/// 관리자: 다른 계정 삭제 (소유 작업 포함).
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "계정 ID")),
    responses(
        (status = 200, description = "삭제 성공", body = MessageResponse),
        (status = 400, description = "자기 자신 삭제 시도", body = ApiErrorResponse),
        (status = 403, description = "관리자 아님", body = ApiErrorResponse),
        (status = 404, description = "계정 없음", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    AdminAccount(identity): AdminAccount,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let target = parse_id(&id, USER_NOT_FOUND)?;
    services::admin_delete_account(&state, &identity, target).await?;
    Ok(Json(MessageResponse::new(
        "User and their tasks deleted successfully.",
    )))
}

/// 관리자: 계정/작업 통계.
#[utoipa::path(
    get,
    path = "/api/users/statistics",
    responses(
        (status = 200, description = "조회 성공", body = Statistics),
        (status = 403, description = "관리자 아님", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn statistics(
    State(state): State<Arc<AppState>>,
    AdminAccount(identity): AdminAccount,
) -> ApiResult<Json<Statistics>> {
    Ok(Json(services::collect_statistics(&state, &identity).await?))
}

/// 계정 라우터 생성.
pub fn users_router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/profile",
            get(get_profile).put(update_profile).delete(delete_profile),
        )
        .route("/statistics", get(statistics))
        .route("/{id}", delete(delete_user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_test_state;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tasker_core::{Account, NewAccount, Role};
    use tower::ServiceExt;

    async fn seed(state: &AppState, email: &str, role: Role) -> (Account, String) {
        let account = state
            .accounts
            .create_account(NewAccount::new("Tester", email, "hash".into(), role))
            .await
            .unwrap();
        let token = state.tokens.issue(&account).unwrap();
        (account, token)
    }

    fn request(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"));
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_update_profile_email_taken_is_400() {
        let state = create_test_state();
        seed(&state, "a@example.com", Role::User).await;
        let (_, token) = seed(&state, "b@example.com", Role::User).await;
        let app = users_router().with_state(Arc::new(state));

        let response = app
            .oneshot(request(
                "PUT",
                "/profile",
                &token,
                Some(json!({"email": "a@example.com"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["message"], "Email is already taken");
    }

    #[tokio::test]
    async fn test_statistics_requires_admin() {
        let state = create_test_state();
        let (_, token) = seed(&state, "u@example.com", Role::User).await;
        let app = users_router().with_state(Arc::new(state));

        let response = app
            .oneshot(request("GET", "/statistics", &token, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_admin_self_delete_is_400() {
        let state = create_test_state();
        let (admin, token) = seed(&state, "admin@example.com", Role::Admin).await;
        let app = users_router().with_state(Arc::new(state));

        let response = app
            .oneshot(request("DELETE", &format!("/{}", admin.id), &token, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["message"],
            "Admins cannot delete themselves."
        );
    }

    #[tokio::test]
    async fn test_admin_delete_unknown_is_404() {
        let state = create_test_state();
        let (_, token) = seed(&state, "admin@example.com", Role::Admin).await;
        let app = users_router().with_state(Arc::new(state));

        let response = app
            .oneshot(request(
                "DELETE",
                &format!("/{}", uuid::Uuid::new_v4()),
                &token,
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_profile_then_token_fails() {
        let state = create_test_state();
        let (_, token) = seed(&state, "me@example.com", Role::User).await;
        let app = users_router().with_state(Arc::new(state));

        let response = app
            .clone()
            .oneshot(request("DELETE", "/profile", &token, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(request("GET", "/profile", &token, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
