//! Target URL normalization and rewriting.
//!
//! # Responsibilities
//! - Turn an inbound request target into an absolute upstream URL
//! - Rewrite `/blob/` pages to `/raw/` so file contents are fetched directly

use crate::routing::classifier::{Classification, ResourceKind};

/// Build the upstream URL from an inbound path-and-query.
///
/// Leading slashes are dropped; `https://` is prefixed unless the remainder
/// already carries an `http://` or `https://` scheme.
pub fn normalize(path_and_query: &str) -> String {
    let raw = path_and_query.trim_start_matches('/');
    if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    }
}

/// Apply shape-specific rewrites to a classified URL.
pub fn rewrite(url: &str, classification: &Classification) -> String {
    match classification.kind() {
        Some(ResourceKind::Content) => url.replacen("/blob/", "/raw/", 1),
        _ => url.to_string(),
    }
}
