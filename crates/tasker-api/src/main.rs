//! Tasker API 서버.
//!
//! Axum 기반 REST API 서버를 시작합니다.
//! 계정 등록/로그인, 소유 작업 관리, 관리자 통계 엔드포인트를 제공합니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{http::StatusCode, middleware, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use secrecy::ExposeSecret;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use tasker_api::metrics::setup_metrics_recorder;
use tasker_api::middleware::metrics_layer;
use tasker_api::openapi::swagger_ui_router;
use tasker_api::repository::{MemoryStore, PgStore};
use tasker_api::routes::create_api_router;
use tasker_api::state::AppState;
use tasker_core::{init_logging, AppConfig, LogConfig};

/// 저장소를 연결하고 AppState를 생성합니다.
///
/// 데이터베이스 URL이 없으면 인메모리 저장소로 동작합니다 (재시작 시 데이터 소실).
async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let state = match config.database.url.as_ref() {
        Some(url) => {
            let store = PgStore::connect(
                url.expose_secret(),
                config.database.max_connections,
                Duration::from_secs(config.database.acquire_timeout_secs),
            )
            .await
            .context("failed to connect to database")?;
            store.migrate().await.context("failed to run migrations")?;
            info!(
                max_connections = config.database.max_connections,
                "Database connected"
            );
            AppState::from_config(config, Arc::new(store))?
        }
        None => {
            warn!("database.url not set, using in-memory store (data is lost on restart)");
            AppState::from_config(config, Arc::new(MemoryStore::new()))?
        }
    };

    if !state.admin_code.is_configured() {
        warn!("auth.admin_code not set, admin registration is disabled");
    }

    Ok(state)
}

/// CORS 레이어 생성.
///
/// - `CORS_ORIGINS`: 쉼표로 구분된 허용 origin 목록
///   예: `https://app.example.com,https://admin.example.com`
fn cors_layer() -> CorsLayer {
    let allow_origin = match std::env::var("CORS_ORIGINS") {
        Ok(origins) if !origins.is_empty() => {
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();

            if origins.is_empty() {
                warn!("CORS_ORIGINS is set but contains no valid origins, allowing any");
                AllowOrigin::any()
            } else {
                info!("CORS configured with {} allowed origins", origins.len());
                AllowOrigin::list(origins)
            }
        }
        _ => {
            warn!("CORS_ORIGINS not set, allowing any origin (development mode)");
            AllowOrigin::any()
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::PATCH,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        .max_age(Duration::from_secs(3600))
}

/// /metrics 엔드포인트 핸들러.
async fn metrics_handler(
    axum::extract::State(handle): axum::extract::State<PrometheusHandle>,
) -> String {
    handle.render()
}

/// 전체 라우터 생성.
fn create_router(
    state: Arc<AppState>,
    metrics_handle: PrometheusHandle,
    request_timeout: Duration,
) -> Router {
    // 메트릭 라우터 (별도 상태)
    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics_handle);

    Router::new()
        .merge(metrics_router)
        .merge(create_api_router().with_state(state))
        // OpenAPI 문서 및 Swagger UI
        .merge(swagger_ui_router())
        // 메트릭 미들웨어 (모든 요청에 적용)
        .layer(middleware::from_fn(metrics_layer))
        .layer(TraceLayer::new_for_http())
        // 전역 타임아웃 - 408 상태 코드 반환
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(cors_layer())
}

/// OpenAPI 스펙 내보내기 처리.
///
/// `--export-openapi` 플래그가 있으면 스펙 JSON을 stdout으로 출력하고 `true`를 반환합니다.
fn handle_export_openapi() -> anyhow::Result<bool> {
    use tasker_api::openapi::ApiDoc;
    use utoipa::OpenApi as _;

    if !std::env::args().any(|arg| arg == "--export-openapi") {
        return Ok(false);
    }

    let json = serde_json::to_string_pretty(&ApiDoc::openapi())?;
    println!("{json}");
    Ok(true)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    if handle_export_openapi()? {
        return Ok(());
    }

    let config = AppConfig::load_default().context("failed to load configuration")?;

    init_logging(LogConfig::from_settings(&config.logging))
        .context("failed to initialize logging")?;

    info!("Starting Tasker API server...");

    let metrics_handle =
        setup_metrics_recorder().context("failed to install Prometheus recorder")?;
    info!("Prometheus metrics recorder initialized");

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .inspect_err(|e| {
            error!(
                host = %config.server.host,
                port = config.server.port,
                error = %e,
                "Invalid socket address, check server.host and server.port"
            );
        })?;

    let state = Arc::new(create_app_state(&config).await?);
    info!(version = %state.version, "Application state initialized");

    let app = create_router(
        state,
        metrics_handle,
        Duration::from_secs(config.server.request_timeout_secs),
    );

    info!(%addr, "API server listening");
    info!("Swagger UI available at http://{}/swagger-ui", addr);
    info!("Metrics available at http://{}/metrics", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped gracefully");

    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 반환합니다.
/// 시그널 핸들러 설치에 실패하면 해당 시그널은 무시합니다.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
