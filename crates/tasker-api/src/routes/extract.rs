//! 요청 본문/쿼리 추출기.
//!
//! axum 기본 거부 응답(평문) 대신 [`ApiError`] 형식의 검증 에러를 반환합니다.

use axum::{
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use tasker_core::TaskerError;
use uuid::Uuid;
use validator::{Validate, ValidateEmail, ValidationError};

use crate::error::ApiError;

/// JSON 파싱 후 `validator` 규칙까지 통과한 본문.
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| TaskerError::invalid_field("body", rejection.body_text()))?;
        value.validate()?;
        Ok(ValidJson(value))
    }
}

/// 파싱 실패를 검증 에러로 바꾸는 쿼리 추출기.
#[derive(Debug, Clone)]
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| TaskerError::invalid_field("query", rejection.body_text()))?;
        Ok(ApiQuery(value))
    }
}

/// 경로의 ID를 파싱합니다. 형식이 잘못된 ID는 "없음"과 같게 취급합니다.
pub fn parse_id(raw: &str, not_found: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError(TaskerError::NotFound(not_found.to_string())))
}

// ==================== 공통 검증 함수 ====================

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

/// 이름: 공백 제거 후 2-50자.
pub fn validate_name(value: &str) -> Result<(), ValidationError> {
    let len = value.trim().chars().count();
    if !(2..=50).contains(&len) {
        return Err(invalid(
            "name_length",
            "Name must be between 2 and 50 characters",
        ));
    }
    Ok(())
}

/// 이메일: 공백 제거 후 올바른 주소 형식.
pub fn validate_email(value: &str) -> Result<(), ValidationError> {
    if !value.trim().validate_email() {
        return Err(invalid("email", "Please provide a valid email"));
    }
    Ok(())
}

/// 작업 제목: 공백 제거 후 1-100자.
pub fn validate_title(value: &str) -> Result<(), ValidationError> {
    let len = value.trim().chars().count();
    if !(1..=100).contains(&len) {
        return Err(invalid(
            "title_length",
            "Title is required and cannot exceed 100 characters",
        ));
    }
    Ok(())
}

/// 작업 설명: 공백 제거 후 500자 이하.
pub fn validate_description(value: &str) -> Result<(), ValidationError> {
    if value.trim().chars().count() > 500 {
        return Err(invalid(
            "description_length",
            "Description cannot exceed 500 characters",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Al").is_ok());
        assert!(validate_name("  A  ").is_err());
        assert!(validate_name(&"x".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email(" ada@example.com ").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn test_validate_title_and_description() {
        assert!(validate_title("   ").is_err());
        assert!(validate_title("Buy milk").is_ok());
        assert!(validate_title(&"t".repeat(101)).is_err());
        assert!(validate_description("").is_ok());
        assert!(validate_description(&"d".repeat(501)).is_err());
    }

    #[test]
    fn test_parse_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string(), "Task not found").unwrap(), id);
        let err = parse_id("42", "Task not found").unwrap_err();
        assert!(matches!(err.0, TaskerError::NotFound(_)));
    }
}
