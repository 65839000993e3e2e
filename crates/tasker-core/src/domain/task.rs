//! 계정이 소유하는 작업.
//!
//! 파생 필드(`is_overdue`)는 저장되지 않고 읽기 시점에 현재 시각으로 계산됩니다.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 작업 상태.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
}

impl TaskStatus {
    /// 반대 상태 반환. 두 번 적용하면 원래 상태가 됩니다.
    pub fn toggled(self) -> Self {
        match self {
            TaskStatus::Pending => TaskStatus::Completed,
            TaskStatus::Completed => TaskStatus::Pending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TaskStatus::Pending),
            "completed" => Some(TaskStatus::Completed),
            _ => None,
        }
    }
}

/// 작업 우선순위.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    /// 정렬용 순위 (낮음 < 보통 < 높음).
    pub fn rank(&self) -> u8 {
        match self {
            TaskPriority::Low => 0,
            TaskPriority::Medium => 1,
            TaskPriority::High => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(TaskPriority::Low),
            "medium" => Some(TaskPriority::Medium),
            "high" => Some(TaskPriority::High),
            _ => None,
        }
    }
}

/// 저장된 작업 레코드.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    /// 소유 계정 ID
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// 마감일이 지났고 아직 완료되지 않았는지 확인.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        match self.due_date {
            Some(due) => self.status == TaskStatus::Pending && now > due,
            None => false,
        }
    }

    /// 상태를 반전합니다.
    pub fn toggle(&mut self, now: DateTime<Utc>) {
        self.status = self.status.toggled();
        self.updated_at = now;
    }

    /// 특정 시점 기준 응답 뷰 생성.
    pub fn view_at(self, now: DateTime<Utc>) -> TaskView {
        let is_overdue = self.is_overdue(now);
        TaskView {
            task: self,
            is_overdue,
        }
    }
}

/// 파생 필드가 포함된 작업 응답.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    #[serde(flatten)]
    pub task: Task,
    pub is_overdue: bool,
}

/// 새 작업 입력 (검증 완료 상태).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: TaskPriority,
}

impl NewTask {
    /// 소유자와 ID를 부여해 레코드 생성.
    pub fn into_task(self, id: Uuid, owner_id: Uuid, now: DateTime<Utc>) -> Task {
        Task {
            id,
            owner_id,
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            due_date: self.due_date,
            status: TaskStatus::Pending,
            priority: self.priority,
            created_at: now,
            updated_at: now,
        }
    }
}

/// 작업 수정 입력. `None` 필드는 변경하지 않습니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
}

impl TaskUpdate {
    /// 작업에 변경 사항 적용.
    pub fn apply(&self, task: &mut Task, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            task.title = title.trim().to_string();
        }
        if let Some(description) = &self.description {
            task.description = description.trim().to_string();
        }
        if let Some(due_date) = self.due_date {
            task.due_date = Some(due_date);
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        task.updated_at = now;
    }
}

/// 목록 정렬 기준.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub enum TaskSortKey {
    #[default]
    CreatedAt,
    DueDate,
    Priority,
    Title,
    Status,
}

/// 정렬 방향.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// 작업 목록 필터.
///
/// 소유자 조건은 여기에 포함되지 않습니다. 저장소 포트가 항상 소유자로 먼저 제한합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    /// 제목/설명 대소문자 무시 부분 일치
    pub search: Option<String>,
    pub sort_by: TaskSortKey,
    pub sort_order: SortOrder,
}

impl TaskFilter {
    /// 작업이 필터 조건을 만족하는지 확인.
    pub fn matches(&self, task: &Task) -> bool {
        if self.status.is_some_and(|s| s != task.status) {
            return false;
        }
        if self.priority.is_some_and(|p| p != task.priority) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => {
                let needle = needle.to_lowercase();
                task.title.to_lowercase().contains(&needle)
                    || task.description.to_lowercase().contains(&needle)
            }
            _ => true,
        }
    }

    fn compare(&self, a: &Task, b: &Task) -> Ordering {
        let ordering = match self.sort_by {
            TaskSortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            // 마감일 없는 작업은 항상 뒤로
            TaskSortKey::DueDate => match (a.due_date, b.due_date) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => return Ordering::Less,
                (None, Some(_)) => return Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            TaskSortKey::Priority => a.priority.rank().cmp(&b.priority.rank()),
            TaskSortKey::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            TaskSortKey::Status => a.status.as_str().cmp(b.status.as_str()),
        };

        match self.sort_order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }

    /// 필터링 후 정렬합니다.
    pub fn apply(&self, tasks: impl IntoIterator<Item = Task>) -> Vec<Task> {
        let mut selected: Vec<Task> = tasks.into_iter().filter(|t| self.matches(t)).collect();
        selected.sort_by(|a, b| self.compare(a, b).then_with(|| a.id.cmp(&b.id)));
        selected
    }
}
