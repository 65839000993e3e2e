//! 관리자 통계.

use tasker_core::{aggregate_statistics, Role, Statistics, TaskerResult};

use crate::auth::{require_role, Identity};
use crate::state::AppState;

/// 전체 계정 수, 관리자 수, 계정별 작업 수를 계산합니다.
///
/// 집계는 저장소 엔진과 무관하게 owner ID 기준으로 수행됩니다.
pub async fn collect_statistics(state: &AppState, identity: &Identity) -> TaskerResult<Statistics> {
    require_role(Role::Admin, identity)?;

    let accounts = state.accounts.list_accounts().await?;
    let owners = state.tasks.task_owner_ids().await?;
    Ok(aggregate_statistics(&accounts, &owners))
}
