//! `TutorServer` — Axum HTTP server over the RPC action boundary.

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::State;
use axum::response::Json;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;
use tracing::info;
use tutor_rpc::context::RpcContext;
use tutor_rpc::registry::MethodRegistry;
use tutor_rpc::types::{RpcRequest, RpcResponse};

use crate::config::ServerConfig;
use crate::health::{self, HealthResponse};
use crate::shutdown::ShutdownCoordinator;

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// RPC method registry.
    pub registry: Arc<MethodRegistry>,
    /// Handler dependency context.
    pub context: Arc<RpcContext>,
    /// When the server started.
    pub start_time: Instant,
}

/// The main Tutor server.
pub struct TutorServer {
    config: ServerConfig,
    registry: Arc<MethodRegistry>,
    context: Arc<RpcContext>,
    shutdown: Arc<ShutdownCoordinator>,
    start_time: Instant,
}

impl TutorServer {
    /// Create a new server.
    pub fn new(config: ServerConfig, registry: MethodRegistry, context: RpcContext) -> Self {
        Self {
            config,
            registry: Arc::new(registry),
            context: Arc::new(context),
            shutdown: Arc::new(ShutdownCoordinator::new()),
            start_time: Instant::now(),
        }
    }

    /// Build the Axum router with all routes.
    pub fn router(&self) -> Router {
        let state = AppState {
            registry: self.registry.clone(),
            context: self.context.clone(),
            start_time: self.start_time,
        };

        Router::new()
            .route("/health", get(health_handler))
            .route("/rpc", post(rpc_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Get the shutdown coordinator.
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.shutdown
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get the method registry.
    pub fn registry(&self) -> &Arc<MethodRegistry> {
        &self.registry
    }

    /// Bind and serve until the shutdown token fires.
    pub async fn serve(&self) -> std::io::Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!(addr = %listener.local_addr()?, "tutor server listening");

        let token = self.shutdown.token();
        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move { token.cancelled().await })
            .await
    }
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let live = state.context.orchestrator.live_count();
    Json(health::health_check(state.start_time, live))
}

/// POST /rpc — dispatch one action-style request.
async fn rpc_handler(
    State(state): State<AppState>,
    Json(request): Json<RpcRequest>,
) -> Json<RpcResponse> {
    Json(state.registry.dispatch(request, &state.context).await)
}
