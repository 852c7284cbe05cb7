//! HTTP Observability Server
//!
//! 提供Prometheus metrics、健康检查和可视化快照端点
//!
//! ## 端点
//! - `GET /metrics` - Prometheus格式的指标
//! - `GET /health` - 健康检查（含订单/骑手统计）
//! - `GET /health/ready` - 就绪检查
//! - `GET /health/live` - 存活检查
//! - `GET /snapshot` - 全部订单与骑手的 JSON 快照，供地图绘制使用
//!
//! ## 使用示例
//! ```rust,ignore
//! let server = ObservabilityServer::new(9090, service.snapshot_handle());
//! tokio::spawn(server.run());
//! ```

use super::health::{HealthChecker, HealthDetails, HealthStatus};
use crate::application::services::SharedSnapshot;
use crate::shared::metrics::METRICS;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    health: Arc<HealthChecker>,
    snapshot: SharedSnapshot,
}

/// 可观测性服务器
pub struct ObservabilityServer {
    addr: SocketAddr,
    state: AppState,
}

impl ObservabilityServer {
    /// 创建新的可观测性服务器
    pub fn new(port: u16, snapshot: SharedSnapshot) -> Self {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        Self {
            addr,
            state: AppState {
                health: Arc::new(HealthChecker::default()),
                snapshot,
            },
        }
    }

    /// 获取健康检查器
    pub fn health_checker(&self) -> Arc<HealthChecker> {
        self.state.health.clone()
    }

    fn router(&self) -> Router {
        Router::new()
            .route("/metrics", get(metrics_handler))
            .route("/health", get(health_handler))
            .route("/health/ready", get(readiness_handler))
            .route("/health/live", get(liveness_handler))
            .route("/snapshot", get(snapshot_handler))
            .with_state(self.state.clone())
    }

    /// 启动HTTP服务器
    pub async fn run(self) -> std::io::Result<()> {
        let app = self.router();

        info!("可观测性服务器启动于 {}", self.addr);
        info!("快照端点: http://{}/snapshot", self.addr);

        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        axum::serve(listener, app).await
    }
}

/// Prometheus metrics端点
async fn metrics_handler() -> Response {
    (StatusCode::OK, METRICS.export()).into_response()
}

/// 健康检查端点
async fn health_handler(State(state): State<AppState>) -> Response {
    let details = HealthDetails::from_snapshot(&state.snapshot.read());
    let response = state.health.check_health_detailed(details);

    let status_code = match response.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(response)).into_response()
}

/// 就绪检查端点
async fn readiness_handler(State(state): State<AppState>) -> Response {
    if state.health.check_readiness() {
        StatusCode::OK.into_response()
    } else {
        StatusCode::SERVICE_UNAVAILABLE.into_response()
    }
}

/// 存活检查端点
async fn liveness_handler(State(state): State<AppState>) -> Response {
    if state.health.check_liveness() {
        StatusCode::OK.into_response()
    } else {
        StatusCode::SERVICE_UNAVAILABLE.into_response()
    }
}

/// 可视化快照端点
async fn snapshot_handler(State(state): State<AppState>) -> Response {
    let snapshot = state.snapshot.read().clone();
    (StatusCode::OK, Json(snapshot)).into_response()
}
