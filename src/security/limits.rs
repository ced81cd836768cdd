//! Upstream size limit.
//!
//! # Design Decisions
//! - Only the declared `Content-Length` is compared; bodies are never buffered
//! - A missing or unparsable length passes the check

use axum::http::header::{self, HeaderMap};

/// The declared `Content-Length`, if present and numeric.
pub fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// `Err(declared)` when the declared length exceeds `limit`.
pub fn check_declared_size(headers: &HeaderMap, limit: u64) -> Result<(), u64> {
    match declared_length(headers) {
        Some(declared) if declared > limit => Err(declared),
        _ => Ok(()),
    }
}

/// Render a byte count for humans, e.g. `10 GB` or `512 MB`.
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["GB", "MB", "KB", "B"];
    const STEPS: [u64; 4] = [1 << 30, 1 << 20, 1 << 10, 1];

    for (unit, step) in UNITS.iter().zip(STEPS) {
        if bytes >= step {
            return if bytes % step == 0 {
                format!("{} {}", bytes / step, unit)
            } else {
                format!("{:.2} {}", bytes as f64 / step as f64, unit)
            };
        }
    }
    "0 B".to_string()
}
