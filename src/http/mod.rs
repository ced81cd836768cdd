//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID + trace layers)
//!     → pipeline.rs (normalize, classify, access check, rewrite)
//!     → forward.rs (upstream request, size check, header/redirect rewrite)
//!     → response.rs (stream upstream body to the client)
//! ```

pub mod forward;
pub mod pipeline;
pub mod request;
pub mod response;
pub mod server;

pub use forward::{build_client, ForwardingEngine};
pub use pipeline::RequestPipeline;
pub use request::X_REQUEST_ID;
pub use server::HttpServer;
