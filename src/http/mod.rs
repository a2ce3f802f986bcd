//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → request.rs (host extraction)
//!     → dispatch.rs (host → route → backend → target)
//!     → target.rs (rewrite URI and Host header)
//!     → forward.rs (send upstream, stream response back)
//!     → response.rs (error mapping when any step fails)
//! ```

pub mod dispatch;
pub mod forward;
pub mod request;
pub mod response;
pub mod server;
pub mod target;

pub use dispatch::Dispatcher;
pub use forward::{Forwarder, HyperForwarder};
pub use request::{request_host, request_id, UuidRequestId, X_REQUEST_ID};
pub use response::ProxyError;
pub use server::{AppState, HttpServer};
pub use target::{Target, TargetError};
