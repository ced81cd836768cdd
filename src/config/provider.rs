//! Snapshot access and periodic refresh.
//!
//! # Design Decisions
//! - Readers take one `Arc<ConfigSnapshot>` per decision; they never hold a lock
//! - The refresher owns the write side; a swap is a single pointer exchange
//! - A failed reload keeps the current snapshot

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::config::loader::{load_config, ConfigError};
use crate::config::schema::ProxyConfig;
use crate::config::snapshot::ConfigSnapshot;

/// Read access to the current policy snapshot.
pub trait ConfigProvider: Send + Sync {
    /// The snapshot in effect right now. Always fully formed.
    fn current(&self) -> Arc<ConfigSnapshot>;
}

/// Lock-free holder of the live snapshot.
#[derive(Debug)]
pub struct ConfigStore {
    current: ArcSwap<ConfigSnapshot>,
}

impl ConfigStore {
    pub fn new(snapshot: ConfigSnapshot) -> Self {
        Self {
            current: ArcSwap::from_pointee(snapshot),
        }
    }

    pub fn from_config(config: &ProxyConfig) -> Self {
        Self::new(ConfigSnapshot::compile(config))
    }

    /// Atomically replace the snapshot. In-flight readers keep the old one.
    pub fn replace(&self, snapshot: ConfigSnapshot) {
        self.current.store(Arc::new(snapshot));
    }

    /// Load `path` and swap in the result.
    pub fn reload_from(&self, path: &Path) -> Result<(), ConfigError> {
        let config = load_config(path)?;
        self.replace(ConfigSnapshot::compile(&config));
        Ok(())
    }
}

impl ConfigProvider for ConfigStore {
    fn current(&self) -> Arc<ConfigSnapshot> {
        self.current.load_full()
    }
}

/// Background task that reloads the config file on a fixed interval and,
/// optionally, whenever the file watcher reports a change.
pub struct ConfigRefresher {
    path: PathBuf,
    store: Arc<ConfigStore>,
    interval: Duration,
}

impl ConfigRefresher {
    pub fn new(path: impl Into<PathBuf>, store: Arc<ConfigStore>, interval: Duration) -> Self {
        Self {
            path: path.into(),
            store,
            interval,
        }
    }

    /// Run until shutdown is signalled.
    ///
    /// `updates` carries configs already loaded by the file watcher; pass
    /// `None` when watching is disabled.
    pub async fn run(
        self,
        mut updates: Option<mpsc::UnboundedReceiver<ProxyConfig>>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            path = ?self.path,
            interval_secs = self.interval.as_secs(),
            "Config refresher started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.store.reload_from(&self.path) {
                        Ok(()) => tracing::info!(path = ?self.path, "Config refreshed"),
                        Err(e) => tracing::error!(
                            path = ?self.path,
                            error = %e,
                            "Failed to refresh config. Keeping current configuration."
                        ),
                    }
                }
                update = next_update(&mut updates) => {
                    match update {
                        Some(config) => {
                            self.store.replace(ConfigSnapshot::compile(&config));
                            tracing::info!(path = ?self.path, "Config reloaded after file change");
                        }
                        None => {
                            tracing::debug!("Config watcher channel closed");
                            updates = None;
                        }
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Config refresher stopped");
                    return;
                }
            }
        }
    }
}

async fn next_update(
    updates: &mut Option<mpsc::UnboundedReceiver<ProxyConfig>>,
) -> Option<ProxyConfig> {
    match updates {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
