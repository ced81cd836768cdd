//! Upstream forwarding.
//!
//! # Responsibilities
//! - Build the shared, pooled upstream client
//! - Send the inbound method, headers and streaming body upstream
//! - Enforce the declared size limit before anything is relayed
//! - Filter response headers and point GitHub redirects back at the proxy
//! - Stream the upstream body to the client
//!
//! # Design Decisions
//! - One attempt per request, no retries
//! - No overall request timeout; large downloads are expected
//! - Transport errors surface as 500 with the error text

use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, HttpBody};
use axum::http::header::{self, HeaderMap, HeaderValue};
use axum::http::Request;
use axum::response::Response;
use futures_util::StreamExt;
use reqwest::redirect::Policy;

use crate::config::UpstreamConfig;
use crate::error::ProxyError;
use crate::http::response::{expects_body, TransferStream};
use crate::routing::Classifier;
use crate::security::headers::{client_response_headers, outbound_request_headers};
use crate::security::limits::check_declared_size;

/// Build the upstream client from configuration.
pub fn build_client(config: &UpstreamConfig) -> Result<reqwest::Client, reqwest::Error> {
    let redirect = if config.follow_redirects {
        Policy::limited(config.max_redirects)
    } else {
        Policy::none()
    };

    let mut builder = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .tcp_keepalive(Duration::from_secs(config.keepalive_secs))
        .pool_idle_timeout(Duration::from_secs(config.pool_idle_timeout_secs))
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .redirect(redirect);

    if let Some(proxy) = &config.proxy {
        builder = builder.proxy(reqwest::Proxy::all(proxy.as_str())?);
    }

    builder.build()
}

/// Relays one request to its upstream and streams the answer back.
#[derive(Clone)]
pub struct ForwardingEngine {
    client: reqwest::Client,
    classifier: Arc<Classifier>,
}

impl ForwardingEngine {
    pub fn new(client: reqwest::Client, classifier: Arc<Classifier>) -> Self {
        Self { client, classifier }
    }

    /// Forward `request` to `target`.
    ///
    /// Returns before the body is streamed; the body is pulled from upstream
    /// as the client reads it.
    pub async fn forward(
        &self,
        request: Request<Body>,
        target: &str,
        size_limit: u64,
        request_id: &str,
    ) -> Result<Response, ProxyError> {
        let url = reqwest::Url::parse(target)
            .map_err(|e| ProxyError::InvalidTarget(format!("{target}: {e}")))?;

        let (parts, body) = request.into_parts();
        let method = parts.method.clone();
        let mut outbound = self
            .client
            .request(parts.method, url)
            .headers(outbound_request_headers(&parts.headers));
        if !body.is_end_stream() {
            outbound = outbound.body(reqwest::Body::wrap_stream(body.into_data_stream()));
        }

        let upstream = outbound.send().await.map_err(|e| {
            if e.is_builder() {
                ProxyError::InvalidTarget(e.to_string())
            } else {
                ProxyError::UpstreamConnect(e)
            }
        })?;

        if let Err(declared) = check_declared_size(upstream.headers(), size_limit) {
            return Err(ProxyError::UpstreamSizeExceeded {
                declared,
                limit: size_limit,
            });
        }

        let status = upstream.status();
        let mut headers = client_response_headers(upstream.headers());
        self.rewrite_location(&mut headers);

        tracing::debug!(
            request_id = %request_id,
            target = %target,
            status = status.as_u16(),
            "Upstream responded"
        );

        let transfer = TransferStream::new(
            upstream.bytes_stream().boxed(),
            request_id,
            target,
            expects_body(&method, status),
        );
        let mut response = Response::new(Body::from_stream(transfer));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }

    /// Point redirects to GitHub resources back through the proxy.
    fn rewrite_location(&self, headers: &mut HeaderMap) {
        let rewritten = headers
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .filter(|location| self.classifier.classify(location).is_github())
            .and_then(|location| HeaderValue::from_str(&format!("/{location}")).ok());

        if let Some(value) = rewritten {
            headers.insert(header::LOCATION, value);
        }
    }
}
