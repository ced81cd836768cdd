//! Error types for the request pipeline.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::security::limits::human_size;
use crate::security::DenyReason;

/// Terminal failures of a pipeline run.
///
/// Every variant maps to exactly one plain-text response. Mid-stream copy
/// failures are not represented: headers are committed by then, so they are
/// only logged by the streaming body.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("{0}")]
    PolicyDenied(DenyReason),

    #[error("Failed to build upstream request: {0}")]
    InvalidTarget(String),

    #[error("Upstream request failed: {0}")]
    UpstreamConnect(#[source] reqwest::Error),

    #[error("File too large: {} exceeds the size limit of {}", size(.declared), size(.limit))]
    UpstreamSizeExceeded { declared: u64, limit: u64 },
}

fn size(bytes: &u64) -> String {
    human_size(*bytes)
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::PolicyDenied(_) => StatusCode::FORBIDDEN,
            ProxyError::InvalidTarget(_) | ProxyError::UpstreamConnect(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ProxyError::UpstreamSizeExceeded { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    /// Short label for logs and metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            ProxyError::PolicyDenied(_) => "rejected",
            ProxyError::InvalidTarget(_) => "invalid_target",
            ProxyError::UpstreamConnect(_) => "upstream_error",
            ProxyError::UpstreamSizeExceeded { .. } => "too_large",
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
