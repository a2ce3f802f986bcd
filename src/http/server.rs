//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the proxy handler
//! - Configure HTTP/1.1 and HTTP/2 support
//! - Wire up middleware (tracing, request ID)
//! - Dispatch requests and forward them to the selected backend
//! - Swap the routing table when a new config arrives
//! - Observability (metrics, correlation IDs)

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{ProxyConfig, UnmatchedRoute};
use crate::http::dispatch::Dispatcher;
use crate::http::forward::{Forwarder, HyperForwarder};
use crate::http::request::{request_host, request_id, UuidRequestId};
use crate::http::response::ProxyError;
use crate::load_balancer::RandomSelector;
use crate::observability::metrics;
use crate::routing::{RoutingTable, SharedRoutingTable};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState<F> {
    pub dispatcher: Dispatcher,
    pub forwarder: F,
    pub unmatched: UnmatchedRoute,
}

/// HTTP server for the reverse proxy.
pub struct HttpServer<F = HyperForwarder> {
    state: AppState<F>,
}

impl HttpServer<HyperForwarder> {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Self {
        Self::with_forwarder(config, HyperForwarder::new())
    }
}

impl<F: Forwarder> HttpServer<F> {
    /// Create a server that sends upstream traffic through `forwarder`.
    pub fn with_forwarder(config: ProxyConfig, forwarder: F) -> Self {
        let table = RoutingTable::from_config(&config.domains);
        tracing::info!(
            domains = table.len(),
            routes = table.route_count(),
            "Routing table built"
        );
        metrics::record_table_loaded(table.route_count());

        let dispatcher = Dispatcher::new(
            SharedRoutingTable::new(table),
            Arc::new(RandomSelector::new()),
        );

        let state = AppState {
            dispatcher,
            forwarder,
            unmatched: config.routing.unmatched,
        };

        Self { state }
    }

    /// Build the Axum router with all middleware layers.
    pub fn app(&self) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler::<F>))
            .route("/", any(proxy_handler::<F>))
            .with_state(self.state.clone())
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// Handle to the live routing table.
    pub fn routing_table(&self) -> SharedRoutingTable {
        self.state.dispatcher.table().clone()
    }

    /// Run the server until `shutdown` fires.
    ///
    /// Configs received on `config_updates` replace the routing table.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<ProxyConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            unmatched = ?self.state.unmatched,
            "HTTP server starting"
        );

        let table = self.routing_table();
        let reloader = tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                let next = RoutingTable::from_config(&config.domains);
                tracing::info!(
                    domains = next.len(),
                    routes = next.route_count(),
                    "Routing table reloaded"
                );
                metrics::record_table_loaded(next.route_count());
                table.replace(next);
            }
        });

        let app = self.app();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        reloader.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main proxy handler.
/// Resolves host, selects backend, and forwards request.
async fn proxy_handler<F: Forwarder>(
    State(state): State<AppState<F>>,
    request: Request<Body>,
) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(&request).to_string();
    let method = request.method().to_string();
    let host = request_host(&request).to_string();

    tracing::info!(
        request_id = %request_id,
        method = %method,
        uri = %request.uri(),
        host = %host,
        "Received request"
    );

    let target = match state.dispatcher.route(&host) {
        Ok(target) => target,
        Err(err) => return reject(err, &state, &request_id, &method, start_time),
    };

    let (mut parts, body) = request.into_parts();
    if let Err(source) = target.rewrite(&mut parts) {
        let err = ProxyError::InvalidTarget {
            address: target.to_string(),
            source,
        };
        return reject(err, &state, &request_id, &method, start_time);
    }

    tracing::debug!(
        request_id = %request_id,
        outbound = %parts.uri,
        "Forwarding request"
    );

    match state.forwarder.forward(Request::from_parts(parts, body)).await {
        Ok(response) => {
            metrics::record_request(&method, response.status().as_u16(), "forwarded", start_time);
            response
        }
        Err(err) => reject(err, &state, &request_id, &method, start_time),
    }
}

fn reject<F>(
    err: ProxyError,
    state: &AppState<F>,
    request_id: &str,
    method: &str,
    start_time: Instant,
) -> Response {
    let status = err.status(state.unmatched);
    match &err {
        ProxyError::RouteNotFound { .. } => {
            tracing::warn!(request_id = %request_id, error = %err, "No route found");
        }
        ProxyError::Upstream(_) => {
            tracing::error!(request_id = %request_id, error = %err, "Upstream error");
        }
        _ => {
            tracing::warn!(request_id = %request_id, status = %status, error = %err, "Request rejected");
        }
    }
    metrics::record_request(method, status.as_u16(), err.kind(), start_time);
    err.into_response_with(state.unmatched)
}
