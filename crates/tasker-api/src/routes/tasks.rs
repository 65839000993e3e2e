//! 작업 endpoint.
//!
//! 모든 핸들러는 요청자 소유 작업만 다룹니다. 다른 계정의 작업 ID는 404로 응답합니다.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tasker_core::{
    NewTask, SortOrder, TaskFilter, TaskPriority, TaskSortKey, TaskStatus, TaskUpdate, TaskView,
};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::extract::{parse_id, validate_description, validate_title, ApiQuery, ValidJson};
use super::MessageResponse;
use crate::auth::CurrentAccount;
use crate::error::{ApiErrorResponse, ApiResult};
use crate::services::tasks::TASK_NOT_FOUND;
use crate::services::OwnedTasks;
use crate::state::AppState;

// ==================== 요청/응답 타입 ====================

/// 작업 목록 쿼리.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TaskQuery {
    /// 상태 필터
    pub status: Option<TaskStatus>,
    /// 우선순위 필터
    pub priority: Option<TaskPriority>,
    /// 제목/설명 부분 일치 (대소문자 무시)
    pub search: Option<String>,
    /// 정렬 기준 (기본 createdAt)
    pub sort_by: Option<TaskSortKey>,
    /// 정렬 방향 (기본 desc)
    pub sort_order: Option<SortOrder>,
}

impl From<TaskQuery> for TaskFilter {
    fn from(query: TaskQuery) -> Self {
        TaskFilter {
            status: query.status,
            priority: query.priority,
            search: query.search,
            sort_by: query.sort_by.unwrap_or_default(),
            sort_order: query.sort_order.unwrap_or_default(),
        }
    }
}

/// 작업 생성 요청.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[validate(custom(function = "validate_title"))]
    pub title: String,
    #[serde(default)]
    #[validate(custom(function = "validate_description"))]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
}

impl From<CreateTaskRequest> for NewTask {
    fn from(req: CreateTaskRequest) -> Self {
        NewTask {
            title: req.title,
            description: req.description.unwrap_or_default(),
            due_date: req.due_date,
            priority: req.priority.unwrap_or_default(),
        }
    }
}

/// 작업 수정 요청. 지정한 필드만 변경됩니다.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[validate(custom(function = "validate_title"))]
    pub title: Option<String>,
    #[validate(custom(function = "validate_description"))]
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
}

impl From<UpdateTaskRequest> for TaskUpdate {
    fn from(req: UpdateTaskRequest) -> Self {
        TaskUpdate {
            title: req.title,
            description: req.description,
            due_date: req.due_date,
            priority: req.priority,
            status: req.status,
        }
    }
}

/// 작업 목록 응답.
#[derive(Debug, Serialize, ToSchema)]
pub struct TasksResponse {
    pub tasks: Vec<TaskView>,
}

/// 작업 단건 응답.
#[derive(Debug, Serialize, ToSchema)]
pub struct TaskResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub task: TaskView,
}

impl TaskResponse {
    fn with_message(message: &str, task: TaskView) -> Self {
        Self {
            message: Some(message.to_string()),
            task,
        }
    }
}

// ==================== 핸들러 ====================

/// 내 작업 목록.
#[utoipa::path(
    get,
    path = "/api/tasks",
    params(TaskQuery),
    responses(
        (status = 200, description = "조회 성공", body = TasksResponse),
        (status = 401, description = "인증 실패", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "tasks"
)]
pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    CurrentAccount(identity): CurrentAccount,
    ApiQuery(query): ApiQuery<TaskQuery>,
) -> ApiResult<Json<TasksResponse>> {
    let tasks = OwnedTasks::new(state.tasks.as_ref(), &identity)
        .list(&TaskFilter::from(query))
        .await?;
    Ok(Json(TasksResponse { tasks }))
}

/// 작업 생성.
#[utoipa::path(
    post,
    path = "/api/tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "생성 성공", body = TaskResponse),
        (status = 400, description = "검증 실패", body = ApiErrorResponse),
        (status = 401, description = "인증 실패", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "tasks"
)]
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    CurrentAccount(identity): CurrentAccount,
    ValidJson(req): ValidJson<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    let task = OwnedTasks::new(state.tasks.as_ref(), &identity)
        .create(req.into())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(TaskResponse::with_message("Task created successfully", task)),
    ))
}

/// 작업 조회.
#[utoipa::path(
    get,
    path = "/api/tasks/{id}",
    params(("id" = String, Path, description = "작업 ID")),
    responses(
        (status = 200, description = "조회 성공", body = TaskResponse),
        (status = 404, description = "없음 또는 다른 계정 소유", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "tasks"
)]
pub async fn get_task(
    State(state): State<Arc<AppState>>,
    CurrentAccount(identity): CurrentAccount,
    Path(id): Path<String>,
) -> ApiResult<Json<TaskResponse>> {
    let id = parse_id(&id, TASK_NOT_FOUND)?;
    let task = OwnedTasks::new(state.tasks.as_ref(), &identity).get(id).await?;
    Ok(Json(TaskResponse {
        message: None,
        task,
    }))
}

/// 작업 수정.
#[utoipa::path(
    put,
    path = "/api/tasks/{id}",
    params(("id" = String, Path, description = "작업 ID")),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "수정 성공", body = TaskResponse),
        (status = 400, description = "검증 실패", body = ApiErrorResponse),
        (status = 404, description = "없음 또는 다른 계정 소유", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "tasks"
)]
pub async fn update_task(
    State(state): State<Arc<AppState>>,
    CurrentAccount(identity): CurrentAccount,
    Path(id): Path<String>,
    ValidJson(req): ValidJson<UpdateTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    let id = parse_id(&id, TASK_NOT_FOUND)?;
    let task = OwnedTasks::new(state.tasks.as_ref(), &identity)
        .update(id, req.into())
        .await?;
    Ok(Json(TaskResponse::with_message("Task updated successfully", task)))
}

/// 작업 삭제.
#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    params(("id" = String, Path, description = "작업 ID")),
    responses(
        (status = 200, description = "삭제 성공", body = MessageResponse),
        (status = 404, description = "없음 또는 다른 계정 소유", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "tasks"
)]
pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    CurrentAccount(identity): CurrentAccount,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_id(&id, TASK_NOT_FOUND)?;
    OwnedTasks::new(state.tasks.as_ref(), &identity)
        .delete(id)
        .await?;
    Ok(Json(MessageResponse::new("Task deleted successfully")))
}

/// 작업 상태 반전 (pending ↔ completed).
#[utoipa::path(
    patch,
    path = "/api/tasks/{id}/toggle",
    params(("id" = String, Path, description = "작업 ID")),
    responses(
        (status = 200, description = "변경 성공", body = TaskResponse),
        (status = 404, description = "없음 또는 다른 계정 소유", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "tasks"
)]
pub async fn toggle_task(
    State(state): State<Arc<AppState>>,
    CurrentAccount(identity): CurrentAccount,
    Path(id): Path<String>,
) -> ApiResult<Json<TaskResponse>> {
    let id = parse_id(&id, TASK_NOT_FOUND)?;
    let task = OwnedTasks::new(state.tasks.as_ref(), &identity)
        .toggle(id)
        .await?;
    Ok(Json(TaskResponse::with_message(
        "Task status updated successfully",
        task,
    )))
}

/// 작업 라우터 생성.
pub fn tasks_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_tasks).post(create_task))
        .route("/{id}", get(get_task).put(update_task).delete(delete_task))
        .route("/{id}/toggle", patch(toggle_task))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenIssuer;
    use crate::state::create_test_state;
    use axum::{
        body::Body,
        http::{header, Request},
    };
    use serde_json::{json, Value};
    use tasker_core::{NewAccount, Role};
    use tower::ServiceExt;

    struct Fixture {
        app: Router,
        token: String,
    }

    async fn fixture() -> Fixture {
        let state = create_test_state();
        let account = state
            .accounts
            .create_account(NewAccount::new("Ada", "ada@example.com", "hash".into(), Role::User))
            .await
            .unwrap();
        let token = state.tokens.issue(&account).unwrap();
        Fixture {
            app: tasks_router().with_state(Arc::new(state)),
            token,
        }
    }

    fn request(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"));
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_create_list_and_filter() {
        let Fixture { app, token } = fixture().await;

        for (title, priority) in [("Buy milk", "low"), ("Write report", "high")] {
            let response = app
                .clone()
                .oneshot(request(
                    "POST",
                    "/",
                    &token,
                    Some(json!({"title": title, "priority": priority})),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = app
            .clone()
            .oneshot(request("GET", "/?priority=high", &token, None))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["tasks"].as_array().unwrap().len(), 1);
        assert_eq!(body["tasks"][0]["title"], "Write report");
        assert_eq!(body["tasks"][0]["isOverdue"], false);

        let response = app
            .oneshot(request("GET", "/?sortBy=title&sortOrder=asc&search=R", &token, None))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["tasks"][0]["title"], "Write report");
    }

    #[tokio::test]
    async fn test_invalid_sort_key_is_validation_error() {
        let Fixture { app, token } = fixture().await;
        let response = app
            .oneshot(request("GET", "/?sortBy=color", &token, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_create_rejects_past_due_date_and_blank_title() {
        let Fixture { app, token } = fixture().await;
        let past = (Utc::now() - chrono::Duration::days(1)).to_rfc3339();

        let response = app
            .clone()
            .oneshot(request("POST", "/", &token, Some(json!({"title": "x", "dueDate": past}))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["details"][0]["field"], "dueDate");

        let response = app
            .oneshot(request("POST", "/", &token, Some(json!({"title": "   "}))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_toggle_and_delete() {
        let Fixture { app, token } = fixture().await;
        let response = app
            .clone()
            .oneshot(request("POST", "/", &token, Some(json!({"title": "Laundry"}))))
            .await
            .unwrap();
        let id = body_json(response).await["task"]["id"]
            .as_str()
            .unwrap()
            .to_string();

        let response = app
            .clone()
            .oneshot(request("PATCH", &format!("/{id}/toggle"), &token, None))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["task"]["status"], "completed");

        let response = app
            .clone()
            .oneshot(request("DELETE", &format!("/{id}"), &token, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(request("GET", &format!("/{id}"), &token, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_id_is_not_found() {
        let Fixture { app, token } = fixture().await;
        let response = app
            .oneshot(request("GET", "/not-a-uuid", &token, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_foreign_token_is_rejected() {
        let Fixture { app, .. } = fixture().await;
        let foreign = TokenIssuer::new(
            &secrecy::SecretString::from("some-other-secret-key-minimum-32-chars"),
            60,
        );
        let stranger = NewAccount::new("Eve", "eve@example.com", "hash".into(), Role::User)
            .into_account(uuid::Uuid::new_v4(), Utc::now());
        let token = foreign.issue(&stranger).unwrap();

        let response = app.oneshot(request("GET", "/", &token, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
