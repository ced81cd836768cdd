//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Classified request:
//!     → access_control.rs (GitHub lists, or proxy-all + substring lists)
//!     → patterns.rs (compiled owner/repo entries)
//! Outbound request / upstream response:
//!     → headers.rs (strip Host, hop-by-hop, origin browser policy)
//!     → limits.rs (declared size vs. limit)
//! ```
//!
//! # Design Decisions
//! - Decisions are pure functions of one snapshot
//! - Blacklists are always evaluated before whitelists
//! - No trust in client input

pub mod access_control;
pub mod headers;
pub mod limits;
pub mod patterns;

pub use access_control::{decide, Decision, DenyReason};
pub use patterns::ListPattern;
