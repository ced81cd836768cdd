//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, or legacy JSON/YAML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (defaults & semantic checks)
//!     → snapshot.rs (compile list patterns, freeze)
//!     → provider.rs (ArcSwap store, read by every request)
//!
//! Every refresh interval, or when watcher.rs sees a change:
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → atomic swap of Arc<ConfigSnapshot>
//!     → requests starting afterwards observe the new snapshot
//! ```
//!
//! # Design Decisions
//! - Snapshots are immutable; changes require a full reload
//! - All fields have defaults to allow minimal configs
//! - Listener and upstream client settings are read once at startup

pub mod loader;
pub mod provider;
pub mod schema;
pub mod snapshot;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, load_or_default, ConfigError};
pub use provider::{ConfigProvider, ConfigRefresher, ConfigStore};
pub use schema::{ObservabilityConfig, ProxyConfig, RefreshConfig, UpstreamConfig};
pub use snapshot::ConfigSnapshot;
