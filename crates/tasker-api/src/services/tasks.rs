//! 소유자 범위 작업 접근.
//!
//! [`OwnedTasks`]는 요청자 ID로 고정된 작업 뷰입니다. 다른 계정의 작업은 존재하지 않는 것과
//! 똑같이 `NotFound`로 보입니다.

use chrono::{DateTime, Utc};
use tasker_core::{NewTask, TaskFilter, TaskUpdate, TaskView, TaskerError, TaskerResult};
use uuid::Uuid;

use crate::auth::Identity;
use crate::repository::TaskStore;

/// 작업 없음 메시지.
pub const TASK_NOT_FOUND: &str = "Task not found";
/// 과거 마감일 메시지.
pub const DUE_DATE_IN_PAST: &str = "Due date cannot be in the past";

fn not_found() -> TaskerError {
    TaskerError::NotFound(TASK_NOT_FOUND.to_string())
}

fn check_due_date(due_date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> TaskerResult<()> {
    match due_date {
        Some(due) if due < now => Err(TaskerError::invalid_field("dueDate", DUE_DATE_IN_PAST)),
        _ => Ok(()),
    }
}

/// 요청자 소유 작업에 대한 접근자.
pub struct OwnedTasks<'a> {
    store: &'a dyn TaskStore,
    owner: &'a Identity,
}

impl<'a> OwnedTasks<'a> {
    pub fn new(store: &'a dyn TaskStore, owner: &'a Identity) -> Self {
        Self { store, owner }
    }

    fn owner_id(&self) -> Uuid {
        self.owner.account_id()
    }

    /// 작업 생성.
    pub async fn create(&self, task: NewTask) -> TaskerResult<TaskView> {
        let now = Utc::now();
        check_due_date(task.due_date, now)?;

        let task = self.store.create_task(self.owner_id(), task).await?;
        Ok(task.view_at(now))
    }

    /// 작업 목록.
    pub async fn list(&self, filter: &TaskFilter) -> TaskerResult<Vec<TaskView>> {
        let now = Utc::now();
        let tasks = self.store.list_tasks(self.owner_id(), filter).await?;
        Ok(tasks.into_iter().map(|t| t.view_at(now)).collect())
    }

    /// 작업 단건 조회.
    pub async fn get(&self, id: Uuid) -> TaskerResult<TaskView> {
        self.store
            .find_task(self.owner_id(), id)
            .await?
            .map(|t| t.view_at(Utc::now()))
            .ok_or_else(not_found)
    }

    /// 작업 수정. 지정하지 않은 필드는 유지됩니다.
    pub async fn update(&self, id: Uuid, update: TaskUpdate) -> TaskerResult<TaskView> {
        let now = Utc::now();
        check_due_date(update.due_date, now)?;

        self.store
            .update_task(self.owner_id(), id, update)
            .await?
            .map(|t| t.view_at(now))
            .ok_or_else(not_found)
    }

    /// 작업 상태 반전.
    pub async fn toggle(&self, id: Uuid) -> TaskerResult<TaskView> {
        self.store
            .toggle_task(self.owner_id(), id)
            .await?
            .map(|t| t.view_at(Utc::now()))
            .ok_or_else(not_found)
    }

    /// 작업 삭제.
    pub async fn delete(&self, id: Uuid) -> TaskerResult<()> {
        if self.store.delete_task(self.owner_id(), id).await? {
            Ok(())
        } else {
            Err(not_found())
        }
    }
}
