//! 통합 API 에러 응답 타입.
//!
//! 모든 API 엔드포인트에서 일관된 에러 형식을 제공합니다.
//! 핵심 에러([`TaskerError`])는 요청 경계에서 [`ApiError`]를 거쳐
//! 안정적인 상태 코드와 메시지로 변환됩니다.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tasker_core::{FieldError, TaskerError};
use utoipa::ToSchema;

/// 통합 API 에러 응답.
///
/// # 예시
///
/// ```json
/// {
///   "code": "VALIDATION_ERROR",
///   "message": "Validation failed",
///   "details": [{ "field": "email", "message": "Please provide a valid email" }],
///   "timestamp": 1738300800
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "VALIDATION_ERROR", "NOT_FOUND")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 추가 에러 상세 정보 (검증 실패 시 필드 목록)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// 에러 발생 타임스탬프 (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ApiErrorResponse {
    /// 기본 에러 생성 (타임스탬프 포함).
    ///
    /// # Arguments
    ///
    /// * `code` - 에러 코드
    /// * `message` - 에러 메시지
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            timestamp: Some(chrono::Utc::now().timestamp()),
        }
    }

    /// 상세 정보 포함 에러 생성.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Value,
    ) -> Self {
        Self {
            details: Some(details),
            ..Self::new(code, message)
        }
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiErrorResponse {}

// ==================== 요청 경계 에러 ====================

/// 핸들러와 추출기가 반환하는 에러.
///
/// 상태 코드 매핑은 이 타입 한 곳에서만 결정됩니다.
#[derive(Debug)]
pub struct ApiError(pub TaskerError);

impl ApiError {
    /// HTTP 상태 코드.
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            TaskerError::Validation(_) => StatusCode::BAD_REQUEST,
            TaskerError::Unauthenticated => StatusCode::UNAUTHORIZED,
            TaskerError::Forbidden(_) => StatusCode::FORBIDDEN,
            TaskerError::InvalidOperation(_) => StatusCode::BAD_REQUEST,
            TaskerError::Conflict(_) => StatusCode::BAD_REQUEST,
            TaskerError::NotFound(_) => StatusCode::NOT_FOUND,
            TaskerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 응답 본문 생성.
    pub fn body(&self) -> ApiErrorResponse {
        let code = self.0.code();
        let message = self.0.public_message();
        match &self.0 {
            TaskerError::Validation(errors) => ApiErrorResponse::with_details(
                code,
                message,
                serde_json::to_value(errors).unwrap_or(Value::Null),
            ),
            _ => ApiErrorResponse::new(code, message),
        }
    }
}

impl From<TaskerError> for ApiError {
    fn from(err: TaskerError) -> Self {
        ApiError(err)
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError(validation_failure(&errors))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let TaskerError::Internal(detail) = &self.0 {
            tracing::error!(error = %detail, "요청 처리 중 내부 에러");
        }
        (self.status(), Json(self.body())).into_response()
    }
}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, ApiError>;

/// `validator` 검증 결과를 필드 에러 목록으로 변환합니다.
///
/// 필드 이름은 요청 JSON과 같은 camelCase로 바뀌며, 필드 이름 순으로 정렬됩니다.
pub fn validation_failure(errors: &validator::ValidationErrors) -> TaskerError {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let name = camel_case(field.as_ref());
            errs.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {name}"));
                FieldError::new(name.clone(), message)
            })
        })
        .collect();
    fields.sort_by(|a, b| a.field.cmp(&b.field));
    TaskerError::Validation(fields)
}

fn camel_case(snake: &str) -> String {
    let mut out = String::with_capacity(snake.len());
    let mut upper = false;
    for c in snake.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (TaskerError::invalid_field("title", "required"), StatusCode::BAD_REQUEST),
            (TaskerError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (TaskerError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (TaskerError::InvalidOperation("x".into()), StatusCode::BAD_REQUEST),
            (TaskerError::Conflict("x".into()), StatusCode::BAD_REQUEST),
            (TaskerError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (TaskerError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError(err).status(), status);
        }
    }

    #[test]
    fn test_internal_detail_is_hidden() {
        let body = ApiError(TaskerError::Internal("relation \"accounts\" does not exist".into()))
            .body();
        assert_eq!(body.code, "INTERNAL_ERROR");
        assert_eq!(body.message, "Server error");
        assert!(body.details.is_none());
    }

    #[test]
    fn test_validation_details_are_listed() {
        let body = ApiError(TaskerError::Validation(vec![
            FieldError::new("email", "Please provide a valid email"),
            FieldError::new("name", "Name must be between 2 and 50 characters"),
        ]))
        .body();

        let details = body.details.unwrap();
        assert_eq!(details[0]["field"], "email");
        assert_eq!(details[1]["message"], "Name must be between 2 and 50 characters");
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("due_date"), "dueDate");
        assert_eq!(camel_case("admin_code"), "adminCode");
        assert_eq!(camel_case("title"), "title");
    }

    #[test]
    fn test_json_serialization_skips_empty_details() {
        let json = serde_json::to_string(&ApiErrorResponse::new("NOT_FOUND", "Task not found"))
            .unwrap();
        assert!(!json.contains("details"));
        assert!(json.contains(r#""code":"NOT_FOUND""#));
        assert!(json.contains(r#""message":"Task not found""#));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_internal_detail_never_public(detail in ".*") {
                let body = ApiError(TaskerError::Internal(detail)).body();
                prop_assert_eq!(body.message, "Server error");
                prop_assert!(body.details.is_none());
            }

            #[test]
            fn prop_camel_case_drops_underscores(field in "[a-z_]{0,24}") {
                let out = camel_case(&field);
                prop_assert!(!out.contains('_'));
                prop_assert_eq!(out.len(), field.chars().filter(|c| *c != '_').count());
            }
        }
    }
}
