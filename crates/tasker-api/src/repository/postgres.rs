//! PostgreSQL 저장소.
//!
//! 이메일 유일성은 UNIQUE 인덱스로, 작업 소유 관계는 `ON DELETE CASCADE` 외래 키로 보장합니다.
//! 계정 삭제는 계정 행을 잠근 뒤 하나의 트랜잭션에서 작업과 계정을 지웁니다.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use tasker_core::{
    Account, NewAccount, NewTask, ProfileUpdate, Role, Task, TaskFilter, TaskPriority, TaskStatus,
    TaskUpdate,
};
use tracing::info;
use uuid::Uuid;

use super::{AccountStore, StoreError, StoreResult, TaskStore};

// ================================================================================================
// Rows
// ================================================================================================

#[derive(Debug, FromRow)]
struct AccountRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = StoreError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let role = Role::parse(&row.role)
            .ok_or_else(|| StoreError::Database(format!("unknown role: {}", row.role)))?;
        Ok(Account {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct TaskRow {
    id: Uuid,
    owner_id: Uuid,
    title: String,
    description: String,
    due_date: Option<DateTime<Utc>>,
    status: String,
    priority: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = StoreError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let status = TaskStatus::parse(&row.status)
            .ok_or_else(|| StoreError::Database(format!("unknown status: {}", row.status)))?;
        let priority = TaskPriority::parse(&row.priority)
            .ok_or_else(|| StoreError::Database(format!("unknown priority: {}", row.priority)))?;
        Ok(Task {
            id: row.id,
            owner_id: row.owner_id,
            title: row.title,
            description: row.description,
            due_date: row.due_date,
            status,
            priority,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const ACCOUNT_COLUMNS: &str = "id, name, email, password_hash, role, created_at, updated_at";
const TASK_COLUMNS: &str =
    "id, owner_id, title, description, due_date, status, priority, created_at, updated_at";

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}

fn map_email_conflict(err: sqlx::Error) -> StoreError {
    if is_unique_violation(&err) {
        StoreError::Conflict("email")
    } else {
        StoreError::from(err)
    }
}

fn into_task(row: Option<TaskRow>) -> StoreResult<Option<Task>> {
    row.map(Task::try_from).transpose()
}

// ================================================================================================
// Store
// ================================================================================================

/// PostgreSQL 계정/작업 저장소.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// 연결 풀을 생성합니다.
    ///
    /// # Arguments
    ///
    /// * `url` - 데이터베이스 URL
    /// * `max_connections` - 최대 연결 수
    /// * `acquire_timeout` - 연결 획득 타임아웃
    pub async fn connect(
        url: &str,
        max_connections: u32,
        acquire_timeout: std::time::Duration,
    ) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(url)
            .await?;
        Ok(Self { pool })
    }

    /// 기존 연결 풀에서 생성합니다.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 데이터베이스 마이그레이션을 실행합니다.
    pub async fn migrate(&self) -> StoreResult<()> {
        info!("Running database migrations...");

        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        info!("Migrations completed successfully");
        Ok(())
    }
}

#[async_trait]
impl AccountStore for PgStore {
    async fn create_account(&self, account: NewAccount) -> StoreResult<Account> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            r#"
            INSERT INTO accounts (id, name, email, password_hash, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ACCOUNT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&account.name)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_email_conflict)?;

        Account::try_from(row)
    }

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .map(Account::try_from)
        .transpose()
    }

    async fn find_account_by_id(&self, id: Uuid) -> StoreResult<Option<Account>> {
        sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(Account::try_from)
        .transpose()
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: ProfileUpdate,
    ) -> StoreResult<Option<Account>> {
        sqlx::query_as::<_, AccountRow>(&format!(
            r#"
            UPDATE accounts SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {ACCOUNT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(update.name)
        .bind(update.email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_email_conflict)?
        .map(Account::try_from)
        .transpose()
    }

    async fn delete_account_cascade(&self, id: Uuid) -> StoreResult<Option<u64>> {
        let mut tx = self.pool.begin().await?;

        // 계정 행 잠금: 동시 작업 생성의 외래 키 검사는 이 트랜잭션이 끝날 때까지 대기
        let locked: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM accounts WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        let removed = sqlx::query("DELETE FROM tasks WHERE owner_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(removed))
    }

    async fn list_accounts(&self) -> StoreResult<Vec<Account>> {
        sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Account::try_from)
        .collect()
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn create_task(&self, owner_id: Uuid, task: NewTask) -> StoreResult<Task> {
        let task = task.into_task(Uuid::new_v4(), owner_id, Utc::now());
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            r#"
            INSERT INTO tasks (id, owner_id, title, description, due_date, status, priority)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(task.id)
        .bind(task.owner_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.due_date)
        .bind(task.status.as_str())
        .bind(task.priority.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                StoreError::OwnerMissing
            } else {
                StoreError::from(e)
            }
        })?;

        Task::try_from(row)
    }

    async fn list_tasks(&self, owner_id: Uuid, filter: &TaskFilter) -> StoreResult<Vec<Task>> {
        let tasks = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE owner_id = $1"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Task::try_from)
        .collect::<StoreResult<Vec<_>>>()?;

        Ok(filter.apply(tasks))
    }

    async fn find_task(&self, owner_id: Uuid, id: Uuid) -> StoreResult<Option<Task>> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND owner_id = $2"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        into_task(row)
    }

    async fn update_task(
        &self,
        owner_id: Uuid,
        id: Uuid,
        update: TaskUpdate,
    ) -> StoreResult<Option<Task>> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            r#"
            UPDATE tasks SET
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                due_date = COALESCE($5, due_date),
                priority = COALESCE($6, priority),
                status = COALESCE($7, status),
                updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(owner_id)
        .bind(update.title.as_deref().map(str::trim))
        .bind(update.description.as_deref().map(str::trim))
        .bind(update.due_date)
        .bind(update.priority.map(|p| p.as_str()))
        .bind(update.status.map(|s| s.as_str()))
        .fetch_optional(&self.pool)
        .await?;
        into_task(row)
    }

    async fn toggle_task(&self, owner_id: Uuid, id: Uuid) -> StoreResult<Option<Task>> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            r#"
            UPDATE tasks SET
                status = CASE status WHEN 'pending' THEN 'completed' ELSE 'pending' END,
                updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        into_task(row)
    }

    async fn delete_task(&self, owner_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn task_owner_ids(&self) -> StoreResult<Vec<Uuid>> {
        Ok(sqlx::query_scalar("SELECT owner_id FROM tasks")
            .fetch_all(&self.pool)
            .await?)
    }
}
