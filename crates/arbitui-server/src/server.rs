//! `GatewayServer` — Axum HTTP + WebSocket server.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use axum::Router;
use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::response::{IntoResponse, Json};
use axum::routing::get;

use arbitui_rpc::EngineClient;
use arbitui_store::Store;

use crate::config::ServerConfig;
use crate::dispatch::DispatchConfig;
use crate::health::{self, HealthResponse};
use crate::shutdown::ShutdownCoordinator;
use crate::websocket::supervisor::run_ws_session;

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Conventions/rates store.
    pub store: Store,
    /// Pricing-engine client.
    pub engine: Arc<dyn EngineClient>,
    /// Server knobs.
    pub config: Arc<ServerConfig>,
    /// Dispatcher knobs, applied to each new session.
    pub dispatch: Arc<DispatchConfig>,
    /// Shutdown coordinator.
    pub shutdown: Arc<ShutdownCoordinator>,
    /// When the server started.
    pub start_time: Instant,
    /// Live session count.
    pub sessions: Arc<AtomicUsize>,
}

/// The gateway server.
pub struct GatewayServer {
    state: AppState,
}

impl GatewayServer {
    /// Create a new server.
    pub fn new(
        config: ServerConfig,
        dispatch: DispatchConfig,
        store: Store,
        engine: Arc<dyn EngineClient>,
    ) -> Self {
        Self {
            state: AppState {
                store,
                engine,
                config: Arc::new(config),
                dispatch: Arc::new(dispatch),
                shutdown: Arc::new(ShutdownCoordinator::new()),
                start_time: Instant::now(),
                sessions: Arc::new(AtomicUsize::new(0)),
            },
        }
    }

    /// Build the Axum router with all routes.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/ws", get(ws_handler))
            .with_state(self.state.clone())
    }

    /// Get the shutdown coordinator.
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.state.shutdown
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.state.config
    }
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let sessions = state.sessions.load(Ordering::Relaxed);
    Json(health::health_check(state.start_time, sessions))
}

/// GET /ws — upgrade and hand the socket to the session supervisor.
async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| run_ws_session(socket, state))
}
