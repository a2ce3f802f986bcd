//! Two-level routing table: domain → subdomain → backend addresses.
//!
//! # Responsibilities
//! - Store the configured routes
//! - Exact-match lookup of (domain, subdomain)
//! - Share an immutable snapshot across requests, replaceable on reload
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(1) lookups via HashMap at both levels
//! - A miss at either level is the same `None`
//! - Reload swaps the whole table through `ArcSwap`, never mutates in place

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use arc_swap::{ArcSwap, Guard};

use crate::config::DomainConfig;

/// A subdomain and the ordered backend addresses that serve it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subdomain {
    name: String,
    servers: Vec<String>,
}

impl Subdomain {
    /// Create a subdomain entry. An empty server list is allowed.
    pub fn new(name: impl Into<String>, servers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            servers,
        }
    }

    pub fn servers(&self) -> &[String] {
        &self.servers
    }
}

/// A domain and its subdomains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    name: String,
    subdomains: HashMap<String, Subdomain>,
}

impl Domain {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            subdomains: HashMap::new(),
        }
    }

    /// Add a subdomain, replacing any previous entry with the same name.
    pub fn with_subdomain(mut self, subdomain: Subdomain) -> Self {
        self.subdomains.insert(subdomain.name.clone(), subdomain);
        self
    }

    pub fn subdomain(&self, name: &str) -> Option<&Subdomain> {
        self.subdomains.get(name)
    }
}

/// The full domain → subdomain → backends mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingTable {
    domains: HashMap<String, Domain>,
}

impl RoutingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from the `[domains]` configuration section.
    pub fn from_config(domains: &BTreeMap<String, DomainConfig>) -> Self {
        let mut table = Self::new();

        for (domain_name, domain_config) in domains {
            let mut domain = Domain::new(domain_name.as_str());
            for (sub_name, sub_config) in &domain_config.subdomains {
                if sub_config.servers.is_empty() {
                    tracing::warn!(
                        domain = %domain_name,
                        subdomain = %sub_name,
                        "Subdomain has no servers; requests will get 503"
                    );
                }
                domain = domain.with_subdomain(Subdomain::new(
                    sub_name.as_str(),
                    sub_config.servers.clone(),
                ));
            }
            table.insert(domain);
        }

        table
    }

    /// Add a domain, replacing any previous entry with the same name.
    pub fn insert(&mut self, domain: Domain) {
        self.domains.insert(domain.name.clone(), domain);
    }

    /// Look up the backend addresses for `subdomain` within `domain`.
    ///
    /// Returns `None` if either key is absent. A present subdomain with
    /// no servers returns an empty slice.
    pub fn lookup(&self, domain: &str, subdomain: &str) -> Option<&[String]> {
        self.domains
            .get(domain)?
            .subdomain(subdomain)
            .map(Subdomain::servers)
    }

    /// Number of domains.
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Number of (domain, subdomain) routes across all domains.
    pub fn route_count(&self) -> usize {
        self.domains.values().map(|d| d.subdomains.len()).sum()
    }
}

/// Cloneable handle to the live routing table.
#[derive(Debug, Clone)]
pub struct SharedRoutingTable {
    inner: Arc<ArcSwap<RoutingTable>>,
}

impl SharedRoutingTable {
    pub fn new(table: RoutingTable) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(table)),
        }
    }

    /// Take a snapshot of the current table.
    pub fn load(&self) -> Guard<Arc<RoutingTable>> {
        self.inner.load()
    }

    /// Atomically replace the table. Readers holding a snapshot keep it.
    pub fn replace(&self, table: RoutingTable) {
        self.inner.store(Arc::new(table));
    }
}
