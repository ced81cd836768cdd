//! GitHub download proxy.
//!
//! Relays GitHub release, archive, raw-content, git-protocol, gist and API
//! traffic through one host, with owner/repo access lists and a size cap.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;

pub use config::ProxyConfig;
pub use error::ProxyError;
pub use http::{HttpServer, RequestPipeline};
pub use lifecycle::Shutdown;
