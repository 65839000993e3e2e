//! 요청별 HTTP 메트릭 수집.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};

use crate::metrics::{record_http_duration, record_http_request, record_http_response};

/// 라우트에 매칭되지 않은 요청의 경로 라벨.
pub const UNMATCHED_ROUTE: &str = "unmatched";

/// 요청의 경로 라벨.
///
/// 라우터에 등록된 템플릿(`/api/tasks/{id}`)을 그대로 씁니다.
/// 매칭되지 않은 요청은 임의 경로가 라벨이 되지 않도록 하나로 묶습니다.
pub fn route_label(request: &Request) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_ROUTE.to_string())
}

/// HTTP 메트릭 미들웨어.
///
/// `Router::layer`로 붙여야 `MatchedPath`를 볼 수 있습니다.
pub async fn metrics_layer(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = route_label(&request);

    record_http_request(&method, &route);
    let response = next.run(request).await;

    record_http_response(&method, &route, response.status().as_u16());
    record_http_duration(&method, &route, start.elapsed().as_secs_f64());
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{HeaderValue, StatusCode},
        middleware,
        routing::{get, patch},
        Router,
    };
    use tower::ServiceExt;

    // 라벨을 응답 헤더로 돌려주는 미들웨어
    async fn echo_route(request: Request, next: Next) -> Response {
        let route = route_label(&request);
        let mut response = next.run(request).await;
        if let Ok(value) = HeaderValue::from_str(&route) {
            response.headers_mut().insert("x-route", value);
        }
        response
    }

    fn router() -> Router {
        Router::new()
            .route("/api/tasks/{id}", get(|| async { "task" }))
            .route("/api/tasks/{id}/toggle", patch(|| async { "toggled" }))
            .route("/api/users/statistics", get(|| async { StatusCode::FORBIDDEN }))
            .layer(middleware::from_fn(echo_route))
    }

    async fn label_for(method: &str, uri: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = router().oneshot(request).await.unwrap();
        let label = response
            .headers()
            .get("x-route")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        (response.status(), label)
    }

    #[tokio::test]
    async fn test_task_ids_collapse_to_template() {
        let (_, a) = label_for("GET", "/api/tasks/123e4567-e89b-12d3-a456-426614174000").await;
        let (_, b) = label_for("GET", "/api/tasks/not-a-uuid").await;
        assert_eq!(a, "/api/tasks/{id}");
        assert_eq!(a, b);

        let (_, toggle) = label_for("PATCH", "/api/tasks/42/toggle").await;
        assert_eq!(toggle, "/api/tasks/{id}/toggle");
    }

    #[tokio::test]
    async fn test_static_route_keeps_its_path() {
        let (status, label) = label_for("GET", "/api/users/statistics").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(label, "/api/users/statistics");
    }

    #[tokio::test]
    async fn test_unknown_paths_share_one_label() {
        let (status, a) = label_for("GET", "/wp-admin/setup.php").await;
        let (_, b) = label_for("GET", "/api/tasks").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(a, UNMATCHED_ROUTE);
        assert_eq!(b, UNMATCHED_ROUTE);
    }

    #[tokio::test]
    async fn test_metrics_layer_passes_response_through() {
        let app = Router::new()
            .route("/api/tasks/{id}", get(|| async { StatusCode::NOT_FOUND }))
            .layer(middleware::from_fn(metrics_layer));

        let request = Request::builder()
            .uri("/api/tasks/abc")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
