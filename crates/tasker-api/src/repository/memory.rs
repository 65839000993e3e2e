//! 인메모리 저장소.
//!
//! 계정/작업 테이블을 하나의 `RwLock` 아래에 둡니다. 유일성 검사와 삽입,
//! 연쇄 삭제는 같은 쓰기 가드 안에서 수행되므로 원자적입니다.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tasker_core::{Account, NewAccount, NewTask, ProfileUpdate, Task, TaskFilter, TaskUpdate};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AccountStore, StoreError, StoreResult, TaskStore};

#[derive(Default)]
struct Tables {
    accounts: HashMap<Uuid, Account>,
    /// 정규화된 이메일 → 계정 ID
    emails: HashMap<String, Uuid>,
    tasks: HashMap<Uuid, Task>,
}

impl Tables {
    fn owned_task_mut(&mut self, owner_id: Uuid, id: Uuid) -> Option<&mut Task> {
        self.tasks.get_mut(&id).filter(|t| t.owner_id == owner_id)
    }
}

/// 인메모리 계정/작업 저장소.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn create_account(&self, account: NewAccount) -> StoreResult<Account> {
        let mut tables = self.tables.write().await;
        if tables.emails.contains_key(&account.email) {
            return Err(StoreError::Conflict("email"));
        }

        let account = account.into_account(Uuid::new_v4(), Utc::now());
        tables.emails.insert(account.email.clone(), account.id);
        tables.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let tables = self.tables.read().await;
        Ok(tables
            .emails
            .get(email)
            .and_then(|id| tables.accounts.get(id))
            .cloned())
    }

    async fn find_account_by_id(&self, id: Uuid) -> StoreResult<Option<Account>> {
        Ok(self.tables.read().await.accounts.get(&id).cloned())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: ProfileUpdate,
    ) -> StoreResult<Option<Account>> {
        let mut tables = self.tables.write().await;
        let Some(current_email) = tables.accounts.get(&id).map(|a| a.email.clone()) else {
            return Ok(None);
        };

        if let Some(email) = &update.email {
            if email != &current_email && tables.emails.contains_key(email) {
                return Err(StoreError::Conflict("email"));
            }
        }

        let Some(account) = tables.accounts.get_mut(&id) else {
            return Ok(None);
        };
        update.apply(account, Utc::now());
        let updated = account.clone();

        if updated.email != current_email {
            tables.emails.remove(&current_email);
            tables.emails.insert(updated.email.clone(), id);
        }
        Ok(Some(updated))
    }

    async fn delete_account_cascade(&self, id: Uuid) -> StoreResult<Option<u64>> {
        let mut tables = self.tables.write().await;
        let Some(account) = tables.accounts.remove(&id) else {
            return Ok(None);
        };
        tables.emails.remove(&account.email);

        let before = tables.tasks.len();
        tables.tasks.retain(|_, t| t.owner_id != id);
        Ok(Some((before - tables.tasks.len()) as u64))
    }

    async fn list_accounts(&self) -> StoreResult<Vec<Account>> {
        let mut accounts: Vec<Account> =
            self.tables.read().await.accounts.values().cloned().collect();
        accounts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(accounts)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn create_task(&self, owner_id: Uuid, task: NewTask) -> StoreResult<Task> {
        let mut tables = self.tables.write().await;
        if !tables.accounts.contains_key(&owner_id) {
            return Err(StoreError::OwnerMissing);
        }

        let task = task.into_task(Uuid::new_v4(), owner_id, Utc::now());
        tables.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn list_tasks(&self, owner_id: Uuid, filter: &TaskFilter) -> StoreResult<Vec<Task>> {
        let tables = self.tables.read().await;
        let owned = tables
            .tasks
            .values()
            .filter(|t| t.owner_id == owner_id)
            .cloned();
        Ok(filter.apply(owned))
    }

    async fn find_task(&self, owner_id: Uuid, id: Uuid) -> StoreResult<Option<Task>> {
        Ok(self
            .tables
            .read()
            .await
            .tasks
            .get(&id)
            .filter(|t| t.owner_id == owner_id)
            .cloned())
    }

    async fn update_task(
        &self,
        owner_id: Uuid,
        id: Uuid,
        update: TaskUpdate,
    ) -> StoreResult<Option<Task>> {
        let mut tables = self.tables.write().await;
        Ok(tables.owned_task_mut(owner_id, id).map(|task| {
            update.apply(task, Utc::now());
            task.clone()
        }))
    }

    async fn toggle_task(&self, owner_id: Uuid, id: Uuid) -> StoreResult<Option<Task>> {
        let mut tables = self.tables.write().await;
        Ok(tables.owned_task_mut(owner_id, id).map(|task| {
            task.toggle(Utc::now());
            task.clone()
        }))
    }

    async fn delete_task(&self, owner_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.owned_task_mut(owner_id, id).is_none() {
            return Ok(false);
        }
        Ok(tables.tasks.remove(&id).is_some())
    }

    async fn task_owner_ids(&self) -> StoreResult<Vec<Uuid>> {
        Ok(self
            .tables
            .read()
            .await
            .tasks
            .values()
            .map(|t| t.owner_id)
            .collect())
    }
}
