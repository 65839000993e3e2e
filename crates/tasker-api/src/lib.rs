//! 멀티 테넌트 작업 관리 REST API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 REST API
//! - 계정 등록/로그인 및 JWT 세션
//! - 소유 계정 범위의 작업 CRUD
//! - 관리자 전용 계정 삭제 및 통계
//! - 헬스 체크 엔드포인트
//! - Prometheus 메트릭
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`services`]: 엔드포인트 뒤의 업무 규칙
//! - [`repository`]: 계정/작업 저장소 포트와 구현 (PostgreSQL, 인메모리)
//! - [`auth`]: 토큰, 비밀번호 해시, 역할 검사
//! - [`metrics`]: Prometheus 메트릭 수집
//! - [`middleware`]: HTTP 미들웨어
//! - [`openapi`]: OpenAPI 문서 및 Swagger UI

pub mod auth;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod openapi;
pub mod repository;
pub mod routes;
pub mod services;
pub mod state;

pub use auth::{AdminAccount, Claims, CurrentAccount, Identity, TokenIssuer};
pub use error::{ApiError, ApiErrorResponse, ApiResult};
pub use metrics::setup_metrics_recorder;
pub use middleware::metrics_layer;
pub use repository::{AccountStore, MemoryStore, PgStore, StoreError, TaskStore};
pub use routes::create_api_router;
pub use state::AppState;

#[cfg(any(test, feature = "test-utils"))]
pub use state::{create_test_state, TEST_ADMIN_CODE, TEST_JWT_SECRET};
