//! # arbitui-gateway
//!
//! Gateway server binary — wires settings, the conventions store, the
//! pricing-engine client, and the WebSocket server together.

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use arbitui_rpc::{ClientConfig, EngineClient, HttpClient, StreamClient};
use arbitui_server::dispatch::{DispatchConfig, MatrixStrategy};
use arbitui_server::{GatewayServer, ServerConfig};
use arbitui_settings::{Settings, Transport};
use arbitui_store::{ConnectionConfig, Store};

/// Arbitrage terminal gateway server.
#[derive(Parser, Debug)]
#[command(name = "arbitui-gateway", about = "Arbitrage terminal gateway server")]
struct Cli {
    /// Host to bind (overrides settings if specified).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides settings if specified).
    #[arg(long)]
    port: Option<u16>,

    /// Path to the `SQLite` conventions database.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Pricing-engine endpoint: an `http(s)://` URL or a Unix socket path
    /// (overrides settings if specified).
    #[arg(long)]
    engine: Option<String>,

    /// Log filter (e.g. `info`, `arbitui_server=debug`).
    #[arg(long, default_value = "info")]
    log: String,
}

fn ensure_parent_dir(path: &std::path::Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

/// Build the engine client from settings plus the optional CLI override.
async fn make_engine(
    settings: &Settings,
    cli_engine: Option<&str>,
) -> Result<Arc<dyn EngineClient>> {
    let rpc_config = ClientConfig {
        max_in_flight: settings.engine.max_requests_in_flight,
        call_timeout: Duration::from_secs(settings.engine.call_timeout_secs),
    };

    if let Some(endpoint) = cli_engine {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            tracing::info!(url = endpoint, "engine transport: http (cli override)");
            return Ok(Arc::new(HttpClient::new(endpoint, rpc_config)));
        }
        tracing::info!(path = endpoint, "engine transport: stream (cli override)");
        let client = StreamClient::connect_unix(endpoint, rpc_config)
            .await
            .with_context(|| format!("failed to connect to engine socket {endpoint}"))?;
        return Ok(Arc::new(client));
    }

    match settings.engine.transport {
        Transport::Http => {
            tracing::info!(url = %settings.engine.rpc_url, "engine transport: http");
            Ok(Arc::new(HttpClient::new(
                settings.engine.rpc_url.clone(),
                rpc_config,
            )))
        }
        Transport::Stream => {
            let path = &settings.engine.socket_path;
            tracing::info!(path = %path.display(), "engine transport: stream");
            let client = StreamClient::connect_unix(path, rpc_config)
                .await
                .with_context(|| {
                    format!("failed to connect to engine socket {}", path.display())
                })?;
            Ok(Arc::new(client))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    arbitui_core::logging::init_subscriber(&args.log);

    let settings = arbitui_settings::load_settings().context("failed to load settings")?;
    std::fs::create_dir_all(&settings.home)
        .with_context(|| format!("failed to create {}", settings.home.display()))?;
    tracing::info!(home = %settings.home.display(), "using settings");

    // Conventions database
    let db_path = args.db_path.unwrap_or_else(|| settings.db_path());
    ensure_parent_dir(&db_path)?;
    let db_str = db_path.to_string_lossy();
    tracing::info!(path = %db_path.display(), "initializing database");
    let pool = arbitui_store::new_file(&db_str, &ConnectionConfig::default())
        .context("failed to open database")?;
    {
        let conn = pool.get().context("failed to get db connection")?;
        arbitui_store::run_migrations(&conn).context("failed to run migrations")?;
    }
    let store = Store::new(pool);

    // Engine client
    let engine = make_engine(&settings, args.engine.as_deref()).await?;

    // Server
    let config = ServerConfig {
        host: args.host.unwrap_or_else(|| settings.server.host.clone()),
        port: args.port.unwrap_or(settings.server.port),
        heartbeat_interval_secs: settings.server.heartbeat_interval_secs,
        inbound_queue_capacity: settings.server.inbound_queue_capacity,
        outbound_queue_capacity: settings.server.outbound_queue_capacity,
    };
    let dispatch = DispatchConfig {
        matrix_strategy: MatrixStrategy::from_bulk_flag(settings.engine.bulk_arbitrage_matrix),
        file_search_path: PathBuf::from(&settings.file_search_path),
    };

    let server = GatewayServer::new(config, dispatch, store, engine);
    let shutdown = Arc::clone(server.shutdown());
    let app = server.router();

    let bind = format!("{}:{}", server.config().host, server.config().port);
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    let addr = listener.local_addr().context("failed to read bound addr")?;
    tracing::info!("gateway listening on ws://{addr}/ws");

    let token = shutdown.token();
    let serve = tokio::spawn(async move {
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(token.cancelled_owned())
            .await;
        if let Err(err) = result {
            tracing::error!(error = %err, "server exited with error");
        }
    });

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")?;

    tracing::info!("shutting down...");
    shutdown.graceful_shutdown(vec![serve], None).await;
    tracing::info!("shutdown complete");
    Ok(())
}
