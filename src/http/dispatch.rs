//! Request dispatch.
//!
//! # State Machine
//! ```text
//! ParsingHost → LookingUpDomain → LookingUpSubdomain → SelectingBackend
//!     → ParsingTargetURL → (server.rs) Forwarding → Done
//!
//! Any step may end in Error:
//!     ParsingHost        → UnsupportedHost   (400)
//!     LookingUp*         → RouteNotFound     (unmatched policy)
//!     SelectingBackend   → NoBackends        (503)
//!     ParsingTargetURL   → InvalidTarget     (500)
//! ```
//!
//! # Design Decisions
//! - Pure and synchronous: no I/O before forwarding
//! - One table snapshot per request; a concurrent reload never splits a lookup

use std::sync::Arc;

use crate::http::response::ProxyError;
use crate::http::target::Target;
use crate::load_balancer::BackendSelector;
use crate::routing::{self, SharedRoutingTable};

/// Resolves an inbound host to a forward target.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    table: SharedRoutingTable,
    selector: Arc<dyn BackendSelector>,
}

impl Dispatcher {
    pub fn new(table: SharedRoutingTable, selector: Arc<dyn BackendSelector>) -> Self {
        Self { table, selector }
    }

    pub fn table(&self) -> &SharedRoutingTable {
        &self.table
    }

    /// Run every pre-forwarding step for `host`.
    pub fn route(&self, host: &str) -> Result<Target, ProxyError> {
        let parts = routing::resolve(host)?;

        let table = self.table.load();
        let servers = table
            .lookup(parts.domain, parts.subdomain)
            .ok_or_else(|| ProxyError::RouteNotFound {
                subdomain: parts.subdomain.to_string(),
                domain: parts.domain.to_string(),
            })?;

        tracing::debug!(
            subdomain = %parts.subdomain,
            domain = %parts.domain,
            servers = servers.len(),
            "Route matched"
        );

        let server = self.selector.select(servers)?;

        let target = Target::parse(server).map_err(|source| ProxyError::InvalidTarget {
            address: server.to_string(),
            source,
        })?;

        tracing::debug!(target = %target, "Backend selected");
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_balancer::{NoBackendsError, RandomSelector};
    use crate::routing::{Domain, RoutingTable, Subdomain};

    fn dispatcher() -> Dispatcher {
        let mut table = RoutingTable::new();
        table.insert(
            Domain::new("example.com")
                .with_subdomain(Subdomain::new("api", vec!["http://127.0.0.1:3000".into()]))
                .with_subdomain(Subdomain::new("empty", vec![]))
                .with_subdomain(Subdomain::new("bad", vec!["://not-a-url".into()])),
        );
        table.insert(
            Domain::new("").with_subdomain(Subdomain::new("localhost", vec!["http://127.0.0.1:4000".into()])),
        );
        Dispatcher::new(SharedRoutingTable::new(table), Arc::new(RandomSelector::new()))
    }

    #[test]
    fn test_route_success() {
        let target = dispatcher().route("api.example.com:8080").unwrap();
        assert_eq!(target.authority().as_str(), "127.0.0.1:3000");
    }

    #[test]
    fn test_route_single_label_host() {
        let target = dispatcher().route("localhost").unwrap();
        assert_eq!(target.authority().as_str(), "127.0.0.1:4000");
    }

    #[test]
    fn test_domain_and_subdomain_miss_are_identical() {
        let d = dispatcher();
        let domain_miss = d.route("api.unknown.com").unwrap_err();
        let subdomain_miss = d.route("unknown.example.com").unwrap_err();
        assert_eq!(domain_miss.kind(), "no_route");
        assert_eq!(subdomain_miss.kind(), "no_route");
    }

    #[test]
    fn test_empty_servers() {
        let err = dispatcher().route("empty.example.com").unwrap_err();
        assert!(matches!(err, ProxyError::NoBackends(NoBackendsError)));
    }

    #[test]
    fn test_bad_target() {
        let err = dispatcher().route("bad.example.com").unwrap_err();
        match err {
            ProxyError::InvalidTarget { address, .. } => assert_eq!(address, "://not-a-url"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_malformed_host() {
        let err = dispatcher().route("user:pass@api.example.com:80").unwrap_err();
        assert!(matches!(err, ProxyError::UnsupportedHost(_)));
    }

    #[test]
    fn test_sees_replaced_table() {
        let d = dispatcher();
        d.table().replace(RoutingTable::new());
        assert_eq!(d.route("api.example.com").unwrap_err().kind(), "no_route");
    }
}
