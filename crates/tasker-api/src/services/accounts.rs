//! 프로필 수정과 계정 삭제.
//!
//! 계정 삭제는 자기 삭제든 관리자 삭제든 저장소의 연쇄 삭제 한 번으로 처리됩니다.

use tasker_core::{Account, ProfileUpdate, Role, TaskerError, TaskerResult};
use tracing::info;
use uuid::Uuid;

use crate::auth::{require_role, Identity};
use crate::repository::StoreError;
use crate::state::AppState;

/// 이메일 중복 메시지.
pub const EMAIL_TAKEN: &str = "Email is already taken";
/// 관리자 자기 삭제 거부 메시지.
pub const ADMIN_SELF_DELETE: &str = "Admins cannot delete themselves.";
/// 계정 없음 메시지.
pub const USER_NOT_FOUND: &str = "User not found.";

/// 자기 프로필(이름/이메일)을 수정합니다.
///
/// 변경 사항이 없으면 현재 계정을 그대로 반환합니다. 역할은 변경할 수 없습니다.
pub async fn update_profile(
    state: &AppState,
    identity: &Identity,
    update: ProfileUpdate,
) -> TaskerResult<Account> {
    if update.is_empty() {
        return Ok(identity.account().clone());
    }

    state
        .accounts
        .update_profile(identity.account_id(), update)
        .await
        .map_err(|e| match e {
            StoreError::Conflict(_) => TaskerError::Conflict(EMAIL_TAKEN.to_string()),
            other => other.into(),
        })?
        // 요청 도중 계정이 삭제됨
        .ok_or(TaskerError::Unauthenticated)
}

/// 자기 계정과 소유 작업을 삭제합니다.
///
/// # Returns
///
/// 함께 삭제된 작업 수
pub async fn delete_own_account(state: &AppState, identity: &Identity) -> TaskerResult<u64> {
    let removed = state
        .accounts
        .delete_account_cascade(identity.account_id())
        .await?
        .ok_or_else(|| TaskerError::NotFound(USER_NOT_FOUND.to_string()))?;

    info!(account_id = %identity.account_id(), tasks_removed = removed, "계정 자기 삭제");
    Ok(removed)
}

/// 관리자가 다른 계정을 삭제합니다.
///
/// 자기 자신을 대상으로 하면 존재 여부를 보기 전에 `InvalidOperation`으로 거부합니다.
pub async fn admin_delete_account(
    state: &AppState,
    identity: &Identity,
    target: Uuid,
) -> TaskerResult<u64> {
    require_role(Role::Admin, identity)?;

    if target == identity.account_id() {
        return Err(TaskerError::InvalidOperation(ADMIN_SELF_DELETE.to_string()));
    }

    let removed = state
        .accounts
        .delete_account_cascade(target)
        .await?
        .ok_or_else(|| TaskerError::NotFound(USER_NOT_FOUND.to_string()))?;

    info!(
        admin_id = %identity.account_id(),
        account_id = %target,
        tasks_removed = removed,
        "관리자 계정 삭제"
    );
    Ok(removed)
}
