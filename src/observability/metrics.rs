//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by method, outcome, status
//! - `proxy_request_duration_seconds` (histogram): time to response headers
//! - `proxy_bytes_streamed_total` (counter): body bytes relayed, by outcome
//! - `proxy_transfers_total` (counter): finished transfers by outcome
//!
//! Recording is a no-op until a recorder is installed.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a finished pipeline run.
pub fn record_request(method: &str, outcome: &'static str, status: u16, start: Instant) {
    counter!(
        "proxy_requests_total",
        "method" => method.to_string(),
        "outcome" => outcome,
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("proxy_request_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

/// Record the end of a streamed body.
pub fn record_transfer(bytes: u64, outcome: &'static str) {
    counter!("proxy_bytes_streamed_total", "outcome" => outcome).increment(bytes);
    counter!("proxy_transfers_total", "outcome" => outcome).increment(1);
}
