//! 작업 관리 시스템의 에러 타입.
//!
//! 요청 경계에서 안정적인 상태 코드/메시지로 변환되는 에러 분류를 정의합니다.
//! 저장소 계층의 상세 정보는 이 타입으로 변환되는 시점에 제거됩니다.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 입력 필드 단위 검증 에러.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct FieldError {
    /// 필드 이름 (요청 JSON 기준)
    pub field: String,
    /// 사람이 읽을 수 있는 메시지
    pub message: String,
}

impl FieldError {
    /// 새 필드 에러 생성.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// 핵심 에러.
#[derive(Debug, Error)]
pub enum TaskerError {
    /// 잘못된 입력 (호출자가 수정 가능)
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// 토큰 누락/위조/만료, 계정 없음, 로그인 실패.
    ///
    /// 원인은 의도적으로 구분하지 않습니다.
    #[error("Not authorized")]
    Unauthenticated,

    /// 인증되었으나 권한 부족 (역할, 관리자 코드)
    #[error("{0}")]
    Forbidden(String),

    /// 허용되지 않는 자기 대상 관리자 작업
    #[error("{0}")]
    InvalidOperation(String),

    /// 유일성 위반
    #[error("{0}")]
    Conflict(String),

    /// 레코드가 없거나 호출자 소유가 아님
    #[error("{0}")]
    NotFound(String),

    /// 저장소/인프라 실패
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 핵심 작업을 위한 Result 타입.
pub type TaskerResult<T> = Result<T, TaskerError>;

impl TaskerError {
    /// 단일 필드 검증 에러 생성.
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        TaskerError::Validation(vec![FieldError::new(field, message)])
    }

    /// 에러 코드 문자열 반환.
    pub fn code(&self) -> &'static str {
        match self {
            TaskerError::Validation(_) => "VALIDATION_ERROR",
            TaskerError::Unauthenticated => "UNAUTHENTICATED",
            TaskerError::Forbidden(_) => "FORBIDDEN",
            TaskerError::InvalidOperation(_) => "INVALID_OPERATION",
            TaskerError::Conflict(_) => "CONFLICT",
            TaskerError::NotFound(_) => "NOT_FOUND",
            TaskerError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 호출자에게 노출해도 되는 메시지.
    ///
    /// `Internal`의 상세 내용은 로그로만 남깁니다.
    pub fn public_message(&self) -> String {
        match self {
            TaskerError::Internal(_) => "Server error".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthenticated_message_is_generic() {
        assert_eq!(TaskerError::Unauthenticated.to_string(), "Not authorized");
        assert_eq!(TaskerError::Unauthenticated.code(), "UNAUTHENTICATED");
    }

    #[test]
    fn test_internal_detail_not_public() {
        let err = TaskerError::Internal("duplicate key value violates unique constraint".into());
        assert_eq!(err.public_message(), "Server error");
        assert!(err.to_string().contains("duplicate key"));
    }

    #[test]
    fn test_invalid_field() {
        match TaskerError::invalid_field("email", "Please provide a valid email") {
            TaskerError::Validation(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "email");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
