//! 인증 endpoint.
//!
//! - `POST /api/auth/register` - 계정 등록
//! - `POST /api/auth/login` - 로그인
//! - `GET /api/auth/me` - 현재 요청자

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::{get, post}, Json, Router};
use serde::{Deserialize, Serialize};
use tasker_core::{AccountProfile, Role};
use utoipa::ToSchema;
use validator::Validate;

use super::extract::{validate_email, validate_name, ValidJson};
use crate::auth::CurrentAccount;
use crate::error::{ApiErrorResponse, ApiResult};
use crate::services::{self, AuthOutcome, Registration};
use crate::state::AppState;

// ==================== 요청/응답 타입 ====================

/// 등록 요청.
#[derive(Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(custom(function = "validate_name"))]
    pub name: String,
    #[validate(custom(function = "validate_email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    /// 요청 역할 (기본값 user)
    #[serde(default)]
    pub role: Role,
    /// 관리자 등록 코드 (role이 admin일 때 필요)
    #[serde(default)]
    pub admin_code: Option<String>,
}

/// 로그인 요청.
#[derive(Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(custom(function = "validate_email"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// 등록/로그인 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: AccountProfile,
}

impl AuthResponse {
    fn new(message: &str, outcome: AuthOutcome) -> Self {
        Self {
            message: message.to_string(),
            token: outcome.token,
            user: outcome.account.profile(),
        }
    }
}

/// 현재 요청자 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub user: AccountProfile,
}

// ==================== 핸들러 ====================

/// 계정 등록.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "등록 성공", body = AuthResponse),
        (status = 400, description = "검증 실패 또는 이메일 중복", body = ApiErrorResponse),
        (status = 403, description = "관리자 코드 불일치", body = ApiErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let outcome = services::register(
        &state,
        Registration {
            name: req.name,
            email: req.email,
            password: req.password,
            role: req.role,
            admin_code: req.admin_code,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse::new("User registered successfully", outcome)),
    ))
}

/// 로그인.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "로그인 성공", body = AuthResponse),
        (status = 400, description = "검증 실패", body = ApiErrorResponse),
        (status = 401, description = "잘못된 자격 증명", body = ApiErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let outcome = services::login(&state, &req.email, &req.password).await?;
    Ok(Json(AuthResponse::new("Login successful", outcome)))
}

/// 현재 요청자 조회.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "조회 성공", body = UserResponse),
        (status = 401, description = "인증 실패", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn me(CurrentAccount(identity): CurrentAccount) -> Json<UserResponse> {
    Json(UserResponse {
        user: identity.account().profile(),
    })
}

/// 인증 라우터 생성.
pub fn auth_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{create_test_state, TEST_ADMIN_CODE};
    use axum::{
        body::Body,
        http::{header, Request},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        auth_router().with_state(Arc::new(create_test_state()))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_register_then_me() {
        let app = app();
        let response = app
            .clone()
            .oneshot(post_json(
                "/register",
                json!({"name": "Ada", "email": "Ada@Example.com", "password": "secret1"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = body_json(response).await;
        assert_eq!(body["user"]["email"], "ada@example.com");
        assert_eq!(body["user"]["role"], "user");
        assert!(body["user"].get("passwordHash").is_none());
        let token = body["token"].as_str().unwrap().to_string();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/me")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["user"]["name"], "Ada");
    }

    #[tokio::test]
    async fn test_register_validation_lists_fields() {
        let response = app()
            .oneshot(post_json(
                "/register",
                json!({"name": "A", "email": "nope", "password": "123"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["code"], "VALIDATION_ERROR");
        let fields: Vec<&str> = body["details"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["email", "name", "password"]);
    }

    #[tokio::test]
    async fn test_register_admin_wrong_code_forbidden() {
        let response = app()
            .oneshot(post_json(
                "/register",
                json!({
                    "name": "Boss", "email": "boss@example.com", "password": "secret1",
                    "role": "admin", "adminCode": "guess"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_register_admin_with_code() {
        let response = app()
            .oneshot(post_json(
                "/register",
                json!({
                    "name": "Boss", "email": "boss@example.com", "password": "secret1",
                    "role": "admin", "adminCode": TEST_ADMIN_CODE
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_json(response).await["user"]["role"], "admin");
    }

    #[tokio::test]
    async fn test_login_failure_is_generic() {
        let app = app();
        app.clone()
            .oneshot(post_json(
                "/register",
                json!({"name": "Ada", "email": "ada@example.com", "password": "secret1"}),
            ))
            .await
            .unwrap();

        let wrong_password = app
            .clone()
            .oneshot(post_json(
                "/login",
                json!({"email": "ada@example.com", "password": "wrong!"}),
            ))
            .await
            .unwrap();
        let unknown_email = app
            .oneshot(post_json(
                "/login",
                json!({"email": "who@example.com", "password": "secret1"}),
            ))
            .await
            .unwrap();

        assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
        let a = body_json(wrong_password).await;
        let b = body_json(unknown_email).await;
        assert_eq!(a["message"], b["message"]);
    }

    #[tokio::test]
    async fn test_me_without_token() {
        let response = app()
            .oneshot(Request::builder().uri("/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["message"], "Not authorized");
    }
}
