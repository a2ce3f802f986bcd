//! Error responses.
//!
//! # Responsibilities
//! - Define the per-request error taxonomy of the dispatch path
//! - Map each error to a status code and fixed body
//!
//! # Design Decisions
//! - Every error is resolved at the request boundary; none abort the process
//! - Route misses honor the configured `UnmatchedRoute` policy
//! - Bodies are fixed plain text, never echo request data

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;
use thiserror::Error;

use crate::config::UnmatchedRoute;
use crate::http::target::TargetError;
use crate::load_balancer::NoBackendsError;
use crate::routing::HostError;

pub const NO_SERVERS_BODY: &str = "No servers available";
pub const INVALID_TARGET_BODY: &str = "Invalid target URL";
pub const UNSUPPORTED_HOST_BODY: &str = "Unsupported host format";
pub const UPSTREAM_FAILED_BODY: &str = "Upstream request failed";

/// Failure anywhere on the dispatch path.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error(transparent)]
    UnsupportedHost(#[from] HostError),

    #[error("no route for subdomain {subdomain:?} of domain {domain:?}")]
    RouteNotFound { subdomain: String, domain: String },

    #[error(transparent)]
    NoBackends(#[from] NoBackendsError),

    #[error("invalid target URL {address:?}: {source}")]
    InvalidTarget {
        address: String,
        #[source]
        source: TargetError,
    },

    #[error("upstream request failed: {0}")]
    Upstream(String),
}

impl ProxyError {
    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::UnsupportedHost(_) => "unsupported_host",
            ProxyError::RouteNotFound { .. } => "no_route",
            ProxyError::NoBackends(_) => "no_backends",
            ProxyError::InvalidTarget { .. } => "invalid_target",
            ProxyError::Upstream(_) => "upstream_error",
        }
    }

    /// Status code this error is answered with.
    pub fn status(&self, unmatched: UnmatchedRoute) -> StatusCode {
        match self {
            ProxyError::UnsupportedHost(_) => StatusCode::BAD_REQUEST,
            ProxyError::RouteNotFound { .. } => match unmatched {
                UnmatchedRoute::Empty => StatusCode::OK,
                UnmatchedRoute::NotFound => StatusCode::NOT_FOUND,
            },
            ProxyError::NoBackends(_) => StatusCode::SERVICE_UNAVAILABLE,
            ProxyError::InvalidTarget { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn body(&self) -> Option<&'static str> {
        match self {
            ProxyError::UnsupportedHost(_) => Some(UNSUPPORTED_HOST_BODY),
            ProxyError::RouteNotFound { .. } => None,
            ProxyError::NoBackends(_) => Some(NO_SERVERS_BODY),
            ProxyError::InvalidTarget { .. } => Some(INVALID_TARGET_BODY),
            ProxyError::Upstream(_) => Some(UPSTREAM_FAILED_BODY),
        }
    }

    /// Build the client-facing response.
    pub fn into_response_with(self, unmatched: UnmatchedRoute) -> Response {
        let mut response = match self.body() {
            Some(text) => {
                let mut response = Response::new(Body::from(text));
                response.headers_mut().insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("text/plain; charset=utf-8"),
                );
                response
            }
            None => Response::new(Body::empty()),
        };
        *response.status_mut() = self.status(unmatched);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn route_not_found() -> ProxyError {
        ProxyError::RouteNotFound {
            subdomain: "unknown".into(),
            domain: "example.com".into(),
        }
    }

    #[tokio::test]
    async fn test_no_backends_is_503() {
        let response = ProxyError::from(NoBackendsError).into_response_with(UnmatchedRoute::Empty);
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_text(response).await, "No servers available");
    }

    #[tokio::test]
    async fn test_invalid_target_is_500() {
        let source = crate::http::target::Target::parse("://not-a-url").unwrap_err();
        let err = ProxyError::InvalidTarget {
            address: "://not-a-url".into(),
            source,
        };
        assert_eq!(err.kind(), "invalid_target");

        let response = err.into_response_with(UnmatchedRoute::Empty);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "Invalid target URL");
    }

    #[tokio::test]
    async fn test_route_not_found_policies() {
        let response = route_not_found().into_response_with(UnmatchedRoute::Empty);
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(header::CONTENT_TYPE).is_none());
        assert_eq!(body_text(response).await, "");

        let response = route_not_found().into_response_with(UnmatchedRoute::NotFound);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(response).await, "");
    }

    #[tokio::test]
    async fn test_unsupported_host_is_400() {
        let err = ProxyError::from(HostError::UnsupportedFormat("a:b:c".into()));
        let response = err.into_response_with(UnmatchedRoute::Empty);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "Unsupported host format");
    }
}
