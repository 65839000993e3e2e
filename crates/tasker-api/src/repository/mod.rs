//! 저장소 포트와 어댑터.
//!
//! 계정/작업 데이터 접근을 라우트 핸들러와 서비스에서 분리합니다.
//! 유일성 및 연쇄 삭제 일관성은 반드시 이 계층에서 원자적으로 보장합니다.
//!
//! - [`MemoryStore`]: 단일 `RwLock` 아래의 인메모리 구현 (테스트, DB 미설정 시)
//! - [`PgStore`]: PostgreSQL 구현

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use tasker_core::{Account, NewAccount, NewTask, ProfileUpdate, Task, TaskFilter, TaskUpdate, TaskerError};
use uuid::Uuid;

/// 저장소 에러.
///
/// 드라이버 메시지는 `Database`에만 담기며 호출자에게는 노출되지 않습니다.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// 유일성 제약 위반 (필드 이름)
    #[error("유일성 제약 위반: {0}")]
    Conflict(&'static str),
    /// 작업 생성 시 소유 계정이 없음
    #[error("소유 계정이 존재하지 않습니다")]
    OwnerMissing,
    #[error("데이터베이스 에러: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

impl From<StoreError> for TaskerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(field) => TaskerError::Conflict(format!("{field} already exists")),
            // 소유 계정이 사라진 요청자는 인증되지 않은 것과 같습니다
            StoreError::OwnerMissing => TaskerError::Unauthenticated,
            StoreError::Database(detail) => TaskerError::Internal(detail),
        }
    }
}

/// 저장소 Result 타입.
pub type StoreResult<T> = Result<T, StoreError>;

/// 계정 저장소 포트.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// 계정 생성. 이메일이 이미 있으면 `Conflict("email")`.
    ///
    /// 유일성 검사와 삽입은 하나의 원자적 단계입니다.
    async fn create_account(&self, account: NewAccount) -> StoreResult<Account>;

    /// 정규화된 이메일로 조회.
    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>>;

    /// ID로 조회.
    async fn find_account_by_id(&self, id: Uuid) -> StoreResult<Option<Account>>;

    /// 이름/이메일 수정. 계정이 없으면 `Ok(None)`, 이메일 중복이면 `Conflict("email")`.
    async fn update_profile(&self, id: Uuid, update: ProfileUpdate)
        -> StoreResult<Option<Account>>;

    /// 계정과 소유 작업을 함께 삭제합니다.
    ///
    /// 계정이 없으면 `Ok(None)`, 있으면 삭제된 작업 수를 반환합니다.
    /// 완료 후 해당 계정 소유 작업은 하나도 남지 않습니다.
    async fn delete_account_cascade(&self, id: Uuid) -> StoreResult<Option<u64>>;

    /// 전체 계정 목록 (생성 순).
    async fn list_accounts(&self) -> StoreResult<Vec<Account>>;

    /// 저장소 연결 확인.
    async fn ping(&self) -> StoreResult<()>;
}

/// 작업 저장소 포트.
///
/// 모든 조회/변경은 소유자 ID로 먼저 제한됩니다. 다른 계정의 작업은 "없음"과 구별되지 않습니다.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// 작업 생성. 소유 계정이 없으면 `OwnerMissing`.
    async fn create_task(&self, owner_id: Uuid, task: NewTask) -> StoreResult<Task>;

    /// 소유자의 작업 목록 (필터/정렬 적용).
    async fn list_tasks(&self, owner_id: Uuid, filter: &TaskFilter) -> StoreResult<Vec<Task>>;

    /// 소유자의 작업 단건 조회.
    async fn find_task(&self, owner_id: Uuid, id: Uuid) -> StoreResult<Option<Task>>;

    /// 소유자의 작업 수정.
    async fn update_task(
        &self,
        owner_id: Uuid,
        id: Uuid,
        update: TaskUpdate,
    ) -> StoreResult<Option<Task>>;

    /// 소유자의 작업 상태 반전.
    async fn toggle_task(&self, owner_id: Uuid, id: Uuid) -> StoreResult<Option<Task>>;

    /// 소유자의 작업 삭제. 삭제되었으면 `true`.
    async fn delete_task(&self, owner_id: Uuid, id: Uuid) -> StoreResult<bool>;

    /// 모든 작업의 소유자 ID (작업 하나당 하나). 통계 집계용.
    async fn task_owner_ids(&self) -> StoreResult<Vec<Uuid>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_never_leaks_driver_text() {
        let err: TaskerError = StoreError::Database("duplicate key value".into()).into();
        assert_eq!(err.public_message(), "Server error");

        let err: TaskerError = StoreError::Conflict("email").into();
        assert!(matches!(err, TaskerError::Conflict(_)));

        let err: TaskerError = StoreError::OwnerMissing.into();
        assert!(matches!(err, TaskerError::Unauthenticated));
    }
}
