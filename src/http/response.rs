//! Streaming response body.
//!
//! # Responsibilities
//! - Relay upstream chunks to the client as they arrive
//! - Count transferred bytes
//! - Log how the transfer ended (completed, failed, client gone)
//!
//! # Design Decisions
//! - No buffering: one upstream chunk in, one downstream chunk out
//! - Status and headers are already committed when this runs, so errors
//!   here are logged, never turned into a response
//! - Dropping the stream drops the upstream body and its connection

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::body::Bytes;
use axum::http::{Method, StatusCode};
use futures_util::stream::{BoxStream, Stream};

use crate::observability::metrics;

/// How a transfer ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Completed,
    Failed,
    ClientDisconnected,
}

impl Outcome {
    fn as_str(self) -> &'static str {
        match self {
            Outcome::Completed => "completed",
            Outcome::Failed => "stream_error",
            Outcome::ClientDisconnected => "client_disconnected",
        }
    }
}

/// Whether the client will read a body for this exchange.
///
/// HEAD, 1xx, 204 and 304 responses carry no body, so the server drops
/// their stream without polling it.
pub fn expects_body(method: &Method, status: StatusCode) -> bool {
    *method != Method::HEAD
        && !status.is_informational()
        && status != StatusCode::NO_CONTENT
        && status != StatusCode::NOT_MODIFIED
}

/// Upstream body wrapper that reports the end of a transfer.
pub struct TransferStream {
    inner: BoxStream<'static, reqwest::Result<Bytes>>,
    request_id: String,
    target: String,
    expects_body: bool,
    bytes: u64,
    started: Instant,
    outcome: Option<Outcome>,
}

impl TransferStream {
    pub fn new(
        inner: BoxStream<'static, reqwest::Result<Bytes>>,
        request_id: impl Into<String>,
        target: impl Into<String>,
        expects_body: bool,
    ) -> Self {
        Self {
            inner,
            request_id: request_id.into(),
            target: target.into(),
            expects_body,
            bytes: 0,
            started: Instant::now(),
            outcome: None,
        }
    }

    fn finish(&mut self, outcome: Outcome) {
        self.outcome = Some(outcome);
        metrics::record_transfer(self.bytes, outcome.as_str());
    }

    /// Outcome to record if the stream is dropped now, if not yet recorded.
    fn outcome_on_drop(&self) -> Option<Outcome> {
        match self.outcome {
            Some(_) => None,
            None if self.expects_body => Some(Outcome::ClientDisconnected),
            None => Some(Outcome::Completed),
        }
    }
}

impl Stream for TransferStream {
    type Item = reqwest::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match this.inner.as_mut().poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                this.bytes += chunk.len() as u64;
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(e))) => {
                if this.outcome.is_none() {
                    tracing::error!(
                        request_id = %this.request_id,
                        target = %this.target,
                        bytes = this.bytes,
                        error = %e,
                        "Response body copy failed"
                    );
                    this.finish(Outcome::Failed);
                }
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                if this.outcome.is_none() {
                    tracing::debug!(
                        request_id = %this.request_id,
                        target = %this.target,
                        bytes = this.bytes,
                        elapsed_ms = this.started.elapsed().as_millis() as u64,
                        "Transfer completed"
                    );
                    this.finish(Outcome::Completed);
                }
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for TransferStream {
    fn drop(&mut self) {
        match self.outcome_on_drop() {
            Some(Outcome::ClientDisconnected) => {
                tracing::info!(
                    request_id = %self.request_id,
                    target = %self.target,
                    bytes = self.bytes,
                    "Client went away mid-transfer, upstream closed"
                );
                self.finish(Outcome::ClientDisconnected);
            }
            Some(outcome) => self.finish(outcome),
            None => {}
        }
    }
}
