//! Forwarding requests to backends.
//!
//! # Responsibilities
//! - Abstract the HTTP client behind the `Forwarder` trait
//! - Strip hop-by-hop headers in both directions
//! - Stream request and response bodies without buffering
//!
//! # Design Decisions
//! - The request arrives already rewritten (absolute URI, Host header)
//! - Outbound requests always go out as HTTP/1.1 over a pooled client
//! - No retries: a failed send is reported once as `ProxyError::Upstream`
//!
//! # Limitations
//! - `Connection` and `Upgrade` are always stripped, so protocol upgrades
//!   (101 Switching Protocols, WebSocket) are not tunneled. A backend that
//!   only answers with 101 is seen as a plain response.

use std::future::Future;

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, Request, Response, Version};
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::http::response::ProxyError;

/// Headers that apply to a single connection and must not be forwarded.
const HOP_BY_HOP: [&str; 9] = [
    "connection",
    "proxy-connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Sends a rewritten request to its backend and returns the streamed response.
pub trait Forwarder: Clone + Send + Sync + 'static {
    fn forward(
        &self,
        request: Request<Body>,
    ) -> impl Future<Output = Result<Response<Body>, ProxyError>> + Send;
}

/// `Forwarder` backed by the hyper-util pooled client.
#[derive(Clone)]
pub struct HyperForwarder {
    client: Client<HttpConnector, Body>,
}

impl HyperForwarder {
    pub fn new() -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self { client }
    }
}

impl Default for HyperForwarder {
    fn default() -> Self {
        Self::new()
    }
}

impl Forwarder for HyperForwarder {
    async fn forward(&self, mut request: Request<Body>) -> Result<Response<Body>, ProxyError> {
        strip_hop_by_hop(request.headers_mut());
        *request.version_mut() = Version::HTTP_11;

        let response: Response<Incoming> = self
            .client
            .request(request)
            .await
            .map_err(|e| ProxyError::Upstream(e.to_string()))?;

        let (mut parts, body) = response.into_parts();
        strip_hop_by_hop(&mut parts.headers);
        Ok(Response::from_parts(parts, Body::new(body)))
    }
}

/// Remove hop-by-hop headers, including any named in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}
