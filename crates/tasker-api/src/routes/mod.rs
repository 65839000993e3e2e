//! API 라우트.
//!
//! 모든 REST API 엔드포인트를 정의하고 라우터를 구성합니다.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/api/auth` - 등록, 로그인, 현재 요청자
//! - `/api/tasks` - 소유 작업 CRUD 및 상태 반전
//! - `/api/users` - 프로필, 관리자 계정 삭제, 통계

pub mod auth;
mod extract;
pub mod health;
pub mod tasks;
pub mod users;

pub use auth::auth_router;
pub use extract::{ApiQuery, ValidJson};
pub use health::health_router;
pub use tasks::tasks_router;
pub use users::users_router;

use axum::Router;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::state::AppState;

/// 메시지만 담은 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// 전체 API 라우터 생성.
///
/// 모든 서브 라우터를 조합하여 하나의 라우터로 반환합니다.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        // 헬스 체크 엔드포인트
        .nest("/health", health_router())
        // API 엔드포인트
        .nest("/api/auth", auth_router())
        .nest("/api/tasks", tasks_router())
        .nest("/api/users", users_router())
}
