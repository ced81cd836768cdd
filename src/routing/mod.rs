//! Routing subsystem: decides what an inbound path refers to upstream.
//!
//! # Data Flow
//! ```text
//! Inbound path-and-query
//!     → rewrite.rs normalize (strip slashes, default https://)
//!     → classifier.rs (ordered shape table)
//!     → matcher.rs (evaluate one shape)
//!     → Return: GitHub{kind, owner, repo} or Unclassified
//!     → rewrite.rs rewrite (blob → raw)
//! ```
//!
//! # Design Decisions
//! - Shape table compiled at startup, immutable at runtime
//! - No regex in hot path (segment matching only)
//! - Deterministic: same input always yields the same classification
//! - First match wins (declaration order)

pub mod classifier;
pub mod matcher;
pub mod rewrite;

pub use classifier::{Classification, Classifier, GitHubResource, ResourceKind};
