//! 도메인 모델.
//!
//! - [`account`]: 계정, 역할, 공개 프로필
//! - [`task`]: 계정이 소유하는 작업과 목록 필터
//! - [`statistics`]: 관리자용 계정별 작업 수 집계

pub mod account;
pub mod statistics;
pub mod task;

pub use account::{normalize_email, normalize_name, Account, AccountProfile, NewAccount, ProfileUpdate, Role};
pub use statistics::{aggregate_statistics, AccountTaskCount, Statistics};
pub use task::{
    NewTask, SortOrder, Task, TaskFilter, TaskPriority, TaskSortKey, TaskStatus, TaskUpdate,
    TaskView,
};
