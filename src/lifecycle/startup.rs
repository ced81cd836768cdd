//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems in dependency order
//! - Start the config refresher (and watcher, when enabled)
//! - Bind the listener and serve until a signal arrives
//!
//! # Design Decisions
//! - Host and port are read once; changing them needs a restart
//! - The upstream client is built once and shared by every request

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::watcher::ConfigWatcher;
use crate::config::{ConfigRefresher, ConfigStore, ProxyConfig};
use crate::http::{build_client, HttpServer, RequestPipeline};
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::wait_for_signal;
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Server(#[source] std::io::Error),

    #[error("server task failed: {0}")]
    ServerTask(#[source] tokio::task::JoinError),
}

/// Run the proxy until SIGINT or SIGTERM.
///
/// `config_path` is the file the refresher re-reads; it need not exist yet.
pub async fn run(config_path: PathBuf, config: ProxyConfig) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let store = Arc::new(ConfigStore::from_config(&config));
    let client = build_client(&config.upstream)?;
    let server = HttpServer::new(RequestPipeline::new(store.clone(), client));
    let shutdown = Shutdown::new();

    // Dropping the handle stops notify, so it lives until run returns.
    let mut _watch_handle = None;
    let updates = if config.refresh.watch {
        let (watcher, rx) = ConfigWatcher::new(&config_path);
        match watcher.run() {
            Ok(handle) => {
                _watch_handle = Some(handle);
                Some(rx)
            }
            Err(e) => {
                tracing::warn!(
                    path = ?config_path,
                    error = %e,
                    "Config watcher unavailable, relying on periodic refresh"
                );
                None
            }
        }
    } else {
        None
    };

    let refresher = ConfigRefresher::new(
        config_path,
        store,
        Duration::from_secs(config.refresh.interval_secs),
    );
    let refresh_task = tokio::spawn(refresher.run(updates, shutdown.subscribe()));

    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;

    tracing::info!(
        address = %address,
        size_limit = config.size_limit,
        allow_proxy_all = config.allow_proxy_all,
        "Configuration loaded"
    );

    let mut server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    // A server that stops on its own still tears down the refresher.
    let finished = tokio::select! {
        _ = wait_for_signal() => None,
        joined = &mut server_task => Some(joined),
    };
    shutdown.trigger();
    let joined = match finished {
        Some(joined) => joined,
        None => server_task.await,
    };

    let served = served_result(joined);
    let _ = refresh_task.await;

    tracing::info!("Shutdown complete");
    served
}

/// Map the joined server task onto the process result.
fn served_result(
    joined: Result<Result<(), std::io::Error>, tokio::task::JoinError>,
) -> Result<(), StartupError> {
    match joined {
        Ok(result) => result.map_err(StartupError::Server),
        Err(e) => {
            tracing::error!(error = %e, "Server task panicked");
            Err(StartupError::ServerTask(e))
        }
    }
}
