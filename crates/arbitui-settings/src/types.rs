//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` for the settings-file
//! JSON format. Each type implements [`Default`] with production default
//! values. Types marked with `#[serde(default)]` allow partial JSON — missing
//! fields get their default value during deserialization.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root settings type for the arbitui gateway.
///
/// Loaded from `~/.local/share/arbitui/settings.json` with defaults applied
/// for missing fields. Environment variables (prefix `ARBITUI_`) can
/// override specific values.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Data directory for the gateway (database, engine socket).
    pub home: PathBuf,
    /// Directory searched for cube files given by relative path.
    pub file_search_path: String,
    /// Network settings for the WebSocket server.
    pub server: ServerSettings,
    /// Pricing-engine connection settings.
    pub engine: EngineSettings,
}

impl Default for Settings {
    fn default() -> Self {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        Self {
            home: PathBuf::from(home)
                .join(".local")
                .join("share")
                .join("arbitui"),
            file_search_path: ".".to_string(),
            server: ServerSettings::default(),
            engine: EngineSettings::default(),
        }
    }
}

impl Settings {
    /// Path to the SQLite conventions database under [`Settings::home`].
    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.home.join("arbitui.db")
    }
}

/// Network settings for the WebSocket server.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Interval between server-side heartbeat pongs, in seconds.
    pub heartbeat_interval_secs: u64,
    /// Capacity of the per-session inbound message queue.
    pub inbound_queue_capacity: usize,
    /// Capacity of the per-session outbound message queue.
    pub outbound_queue_capacity: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            heartbeat_interval_secs: 3,
            inbound_queue_capacity: 256,
            outbound_queue_capacity: 1024,
        }
    }
}

/// Transport used to reach the pricing engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// JSON-RPC over HTTP POST.
    Http,
    /// Newline-delimited JSON-RPC over a Unix domain socket.
    Stream,
}

/// Pricing-engine connection settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineSettings {
    /// Which transport to use.
    pub transport: Transport,
    /// HTTP endpoint for the `http` transport.
    pub rpc_url: String,
    /// Unix socket path for the `stream` transport.
    pub socket_path: PathBuf,
    /// Admission ceiling on concurrent in-flight engine calls.
    pub max_requests_in_flight: usize,
    /// Per-call timeout, in seconds.
    pub call_timeout_secs: u64,
    /// Compute the full arbitrage matrix in one engine call instead of
    /// one call per cube cell.
    pub bulk_arbitrage_matrix: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            transport: Transport::Http,
            rpc_url: "http://localhost:8090/rpc".to_string(),
            socket_path: PathBuf::from("/tmp/arbitui-engine.sock"),
            max_requests_in_flight: 512,
            call_timeout_secs: 30,
            bulk_arbitrage_matrix: true,
        }
    }
}
