//! Name-based HTTP reverse proxy library.
//!
//! Requests are routed by host name: the first label is the subdomain, the
//! rest is the domain, and the pair selects a pool of backend URLs.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;
pub mod routing;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
