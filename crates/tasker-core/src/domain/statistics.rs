//! 관리자 통계 집계.
//!
//! 저장소 엔진과 무관하게 owner ID 기준 group-by-reduce로 계산합니다.
//! 작업이 없는 계정도 0으로 포함됩니다.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::account::{Account, Role};

/// 계정별 작업 수.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AccountTaskCount {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub task_count: u64,
}

/// 전체 통계.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_users: u64,
    pub total_admins: u64,
    pub user_stats: Vec<AccountTaskCount>,
}

impl Statistics {
    /// 모든 계정의 작업 수 합계.
    pub fn total_tasks(&self) -> u64 {
        self.user_stats.iter().map(|s| s.task_count).sum()
    }

    /// 특정 계정의 작업 수.
    pub fn task_count_of(&self, account_id: Uuid) -> Option<u64> {
        self.user_stats
            .iter()
            .find(|s| s.id == account_id)
            .map(|s| s.task_count)
    }
}

/// 계정 목록과 작업 owner ID 목록으로 통계를 계산합니다.
///
/// `owner_ids`는 작업 하나당 한 번씩 나타나는 owner ID 시퀀스입니다.
/// 계정 목록에 없는 owner ID는 집계에서 제외됩니다.
pub fn aggregate_statistics<'a>(
    accounts: &[Account],
    owner_ids: impl IntoIterator<Item = &'a Uuid>,
) -> Statistics {
    let mut counts: HashMap<Uuid, u64> = HashMap::with_capacity(accounts.len());
    for owner in owner_ids {
        *counts.entry(*owner).or_insert(0) += 1;
    }

    let user_stats = accounts
        .iter()
        .map(|account| AccountTaskCount {
            id: account.id,
            name: account.name.clone(),
            email: account.email.clone(),
            role: account.role,
            task_count: counts.get(&account.id).copied().unwrap_or(0),
        })
        .collect();

    Statistics {
        total_users: accounts.len() as u64,
        total_admins: accounts.iter().filter(|a| a.role.is_admin()).count() as u64,
        user_stats,
    }
}
