//! OpenAPI 문서화 설정.
//!
//! utoipa를 사용하여 REST API의 OpenAPI 3.0 스펙을 생성합니다.
//! Swagger UI는 `/swagger-ui` 경로에서 사용 가능합니다.
//!
//! 새로운 엔드포인트를 추가할 때:
//!
//! 1. 응답/요청 타입에 `#[derive(ToSchema)]` 추가
//! 2. 핸들러에 `#[utoipa::path(...)]` 어노테이션 추가
//! 3. 이 파일의 `components(schemas(...))` 및 `paths(...)` 섹션에 추가

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::error::ApiErrorResponse;
use crate::routes::{
    auth::{AuthResponse, LoginRequest, RegisterRequest, UserResponse},
    health::HealthResponse,
    tasks::{CreateTaskRequest, TaskResponse, TasksResponse, UpdateTaskRequest},
    users::{ProfileUpdatedResponse, UpdateProfileRequest},
    MessageResponse,
};
use tasker_core::{
    AccountProfile, AccountTaskCount, FieldError, Role, SortOrder, Statistics, Task, TaskPriority,
    TaskSortKey, TaskStatus, TaskView,
};

/// `bearer_auth` 보안 스키마 등록.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

// ==================== OpenAPI 문서 정의 ====================

/// Tasker API 문서.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tasker API",
        description = r#"
# Tasker REST API

계정별 작업 관리 API입니다.

## 인증

보호된 엔드포인트는 `Authorization: Bearer <token>` 헤더가 필요합니다.
토큰은 등록 또는 로그인 응답으로 발급됩니다.

## 소유 범위

작업은 소유 계정만 조회/수정/삭제할 수 있습니다. 다른 계정의 작업은 404로 응답합니다.
"#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:5000", description = "로컬 개발 서버"),
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "헬스 체크 - 서버 상태 확인"),
        (name = "auth", description = "인증 - 등록, 로그인, 현재 요청자"),
        (name = "tasks", description = "작업 - 소유 작업 CRUD"),
        (name = "users", description = "계정 - 프로필, 관리자 기능")
    ),
    // ==================== 스키마 등록 ====================
    components(
        schemas(
            // ===== Common =====
            ApiErrorResponse,
            FieldError,
            MessageResponse,
            HealthResponse,
            // ===== Auth =====
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            UserResponse,
            AccountProfile,
            Role,
            // ===== Tasks =====
            Task,
            TaskView,
            TaskStatus,
            TaskPriority,
            TaskSortKey,
            SortOrder,
            CreateTaskRequest,
            UpdateTaskRequest,
            TaskResponse,
            TasksResponse,
            // ===== Users =====
            UpdateProfileRequest,
            ProfileUpdatedResponse,
            Statistics,
            AccountTaskCount,
        )
    ),
    // ==================== 경로 등록 ====================
    paths(
        // ===== Health =====
        crate::routes::health::health_check,
        crate::routes::health::health_ready,
        // ===== Auth =====
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::me,
        // ===== Tasks =====
        crate::routes::tasks::list_tasks,
        crate::routes::tasks::create_task,
        crate::routes::tasks::get_task,
        crate::routes::tasks::update_task,
        crate::routes::tasks::delete_task,
        crate::routes::tasks::toggle_task,
        // ===== Users =====
        crate::routes::users::get_profile,
        crate::routes::users::update_profile,
        crate::routes::users::delete_profile,
        crate::routes::users::delete_user,
        crate::routes::users::statistics,
    )
)]
pub struct ApiDoc;

// ==================== Swagger UI 라우터 ====================

/// Swagger UI 라우터 생성.
///
/// 다음 경로에 문서 UI를 마운트합니다:
/// - `/swagger-ui` - Swagger UI 대화형 문서
/// - `/api-docs/openapi.json` - OpenAPI JSON 스펙
pub fn swagger_ui_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}
