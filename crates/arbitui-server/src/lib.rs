//! # arbitui-server
//!
//! Axum HTTP + `WebSocket` gateway for the arbitrage terminal UI.
//!
//! - HTTP endpoints: health check, `WebSocket` upgrade
//! - Session supervision: recv/send/heartbeat/dispatch tasks per connection,
//!   scoped by a `JoinSet` + `CancellationToken`
//! - Request dispatch: store lookups and pricing-engine calls per client
//!   message, with per-request failure isolation
//! - Graceful shutdown via `tokio::signal` + `CancellationToken`

#![deny(unsafe_code)]

pub mod config;
pub mod dispatch;
pub mod health;
pub mod server;
pub mod shutdown;
pub mod websocket;

pub use config::ServerConfig;
pub use dispatch::{DispatchConfig, Dispatcher, MatrixStrategy};
pub use server::{AppState, GatewayServer};
pub use shutdown::ShutdownCoordinator;
