//! Request handling helpers.
//!
//! # Responsibilities
//! - Generate unique request IDs (UUID v4)
//! - Extract the routing host from a request
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - An existing `x-request-id` from the client is kept as-is
//! - Host comes from the `Host` header, falling back to the URI authority (HTTP/2)

use axum::http::{header, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates `x-request-id` values for requests that arrive without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let value = HeaderValue::from_str(&Uuid::new_v4().to_string()).ok()?;
        Some(RequestId::new(value))
    }
}

/// The request's ID, or `"unknown"` if none is set.
pub fn request_id<B>(request: &Request<B>) -> &str {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// The host the client addressed, as received.
///
/// Returns an empty string if neither a readable `Host` header nor a URI
/// authority is present.
pub fn request_host<B>(request: &Request<B>) -> &str {
    request
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| request.uri().authority().map(|a| a.as_str()))
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_header_wins() {
        let req = Request::builder()
            .uri("http://other.example.com/")
            .header("host", "api.example.com:8080")
            .body(())
            .unwrap();
        assert_eq!(request_host(&req), "api.example.com:8080");
    }

    #[test]
    fn test_host_from_authority() {
        let req = Request::builder()
            .uri("http://api.example.com/path")
            .body(())
            .unwrap();
        assert_eq!(request_host(&req), "api.example.com");
    }

    #[test]
    fn test_missing_host() {
        let req = Request::builder().uri("/path").body(()).unwrap();
        assert_eq!(request_host(&req), "");
        assert_eq!(request_id(&req), "unknown");
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let req = Request::builder().body(()).unwrap();
        let mut make = UuidRequestId;
        let a = make.make_request_id(&req).unwrap();
        let b = make.make_request_id(&req).unwrap();
        assert_ne!(a.header_value(), b.header_value());
        assert_eq!(a.header_value().len(), 36);
    }
}
