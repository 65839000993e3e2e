//! 역할 기반 접근 제어.
//!
//! 역할 판정 자체는 [`Role::satisfies`]의 순수 함수이며, 여기서는 이를 요청 경계 에러로 바꿉니다.

use tasker_core::{Role, TaskerError};

use super::Identity;

/// 관리자 전용 작업 거부 메시지.
pub const ADMIN_ONLY: &str = "Access denied. Admins only.";

/// 특정 역할을 요구하는 가드.
///
/// # Arguments
///
/// * `required_role` - 필요한 역할
/// * `identity` - 해석된 요청자
///
/// # Returns
///
/// 역할이 충분하면 Ok(()), 부족하면 `Forbidden`
pub fn require_role(required_role: Role, identity: &Identity) -> Result<(), TaskerError> {
    if identity.role().satisfies(required_role) {
        Ok(())
    } else {
        Err(TaskerError::Forbidden(ADMIN_ONLY.to_string()))
    }
}
