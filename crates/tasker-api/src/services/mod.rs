//! 요청 경계 아래의 서비스 계층.
//!
//! 핸들러는 입력 검증과 응답 변환만 담당하고, 규칙은 여기서 [`TaskerError`]로 표현합니다.
//! 모든 함수는 해석된 [`Identity`](crate::auth::Identity)를 명시적 인자로 받습니다.
//!
//! [`TaskerError`]: tasker_core::TaskerError

pub mod accounts;
pub mod registration;
pub mod statistics;
pub mod tasks;

pub use accounts::{admin_delete_account, delete_own_account, update_profile};
pub use registration::{login, register, AuthOutcome, Registration};
pub use statistics::collect_statistics;
pub use tasks::OwnedTasks;
