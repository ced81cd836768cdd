//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router whose fallback is the request pipeline
//! - Wire up middleware (request ID, tracing)
//! - Bind server to listener
//! - Shut down gracefully on signal

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::http::pipeline::RequestPipeline;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<RequestPipeline>,
}

/// HTTP server for the proxy.
pub struct HttpServer {
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server around a pipeline.
    pub fn new(pipeline: RequestPipeline) -> Self {
        Self {
            state: AppState {
                pipeline: Arc::new(pipeline),
            },
        }
    }

    /// The Axum router with all middleware layers.
    ///
    /// Only a fallback is registered, so hosts embedding the router can add
    /// their own routes (static assets, introspection) in front of it.
    pub fn router(&self) -> Router {
        Router::new()
            .fallback(proxy_handler)
            .with_state(self.state.clone())
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Proxy handler for every unmatched method and path.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    state.pipeline.handle(request).await
}
