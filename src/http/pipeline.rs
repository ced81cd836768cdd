//! Per-request pipeline.
//!
//! # Stages
//! ```text
//! Received → Normalized → Classified → AccessChecked → Rewritten → Forwarded
//!                                         │                          │
//!                                         ▼                          ▼
//!                                      Rejected               Completed | Failed
//!                                   (403 + reason)            (stream / 500, 413)
//! ```
//!
//! # Design Decisions
//! - One inbound request is exactly one run; nothing is retried
//! - Each decision point loads one snapshot and uses it for the whole decision
//! - Every stage returns a typed outcome; nothing escapes unhandled

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::Request;
use axum::response::{IntoResponse, Response};

use crate::config::ConfigProvider;
use crate::error::ProxyError;
use crate::http::forward::ForwardingEngine;
use crate::http::request::request_id;
use crate::observability::metrics;
use crate::routing::{rewrite, Classification, Classifier};
use crate::security::{decide, Decision};

/// Orchestrates classification, policy, rewriting and forwarding.
#[derive(Clone)]
pub struct RequestPipeline {
    config: Arc<dyn ConfigProvider>,
    classifier: Arc<Classifier>,
    engine: ForwardingEngine,
}

impl RequestPipeline {
    pub fn new(config: Arc<dyn ConfigProvider>, client: reqwest::Client) -> Self {
        let classifier = Arc::new(Classifier::new());
        Self {
            config,
            engine: ForwardingEngine::new(client, classifier.clone()),
            classifier,
        }
    }

    /// Entry point for every request not served by another route.
    pub async fn handle(&self, request: Request<Body>) -> Response {
        let start = Instant::now();
        let request_id = request_id(&request);
        let method = request.method().clone();

        match self.run(request, &request_id).await {
            Ok(response) => {
                metrics::record_request(method.as_str(), "forwarded", response.status().as_u16(), start);
                response
            }
            Err(e) => {
                match &e {
                    ProxyError::PolicyDenied(reason) => tracing::warn!(
                        request_id = %request_id,
                        reason = reason.as_str(),
                        "Request rejected"
                    ),
                    ProxyError::UpstreamSizeExceeded { declared, limit } => tracing::warn!(
                        request_id = %request_id,
                        declared,
                        limit,
                        "Upstream body exceeds size limit"
                    ),
                    _ => tracing::error!(request_id = %request_id, error = %e, "Forwarding failed"),
                }
                metrics::record_request(method.as_str(), e.outcome(), e.status().as_u16(), start);
                e.into_response()
            }
        }
    }

    async fn run(&self, request: Request<Body>, request_id: &str) -> Result<Response, ProxyError> {
        let path_and_query = request
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let target = rewrite::normalize(path_and_query);

        let classification = self.classifier.classify(&target);
        match &classification {
            Classification::GitHub(resource) => tracing::debug!(
                request_id = %request_id,
                method = %request.method(),
                target = %target,
                kind = resource.kind.as_str(),
                owner = %resource.owner,
                repo = %resource.repo,
                "Classified GitHub resource"
            ),
            Classification::Unclassified => tracing::debug!(
                request_id = %request_id,
                method = %request.method(),
                target = %target,
                "Unclassified target"
            ),
        }

        self.check_access(&classification, &target)?;

        let target = rewrite::rewrite(&target, &classification);
        let size_limit = self.config.current().size_limit;

        tracing::info!(
            request_id = %request_id,
            method = %request.method(),
            target = %target,
            "Proxying request"
        );
        self.engine
            .forward(request, &target, size_limit, request_id)
            .await
    }

    fn check_access(&self, classification: &Classification, target: &str) -> Result<(), ProxyError> {
        let snapshot = self.config.current();
        match decide(classification, target, &snapshot) {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(ProxyError::PolicyDenied(reason)),
        }
    }
}
