//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration for the reverse proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Dispatch behavior.
    pub routing: RoutingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Routing table: domain name → subdomains → servers.
    pub domains: BTreeMap<String, DomainConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Dispatch configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RoutingConfig {
    /// Response when no domain/subdomain matches the host.
    pub unmatched: UnmatchedRoute,
}

/// What to send when a host has no route.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedRoute {
    /// Write nothing: default status (200) and an empty body.
    #[default]
    Empty,
    /// 404 Not Found with an empty body.
    NotFound,
}

/// One domain's subdomains.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct DomainConfig {
    #[serde(default)]
    pub subdomains: BTreeMap<String, SubdomainConfig>,
}

/// One subdomain's backend servers.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct SubdomainConfig {
    /// Backend URLs (e.g., "http://127.0.0.1:3000"). May be empty.
    #[serde(default)]
    pub servers: Vec<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: ProxyConfig = toml::from_str("").unwrap();
        assert_eq!(config, ProxyConfig::default());
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.routing.unmatched, UnmatchedRoute::Empty);
        assert!(config.domains.is_empty());
    }

    #[test]
    fn test_domains_table() {
        let config: ProxyConfig = toml::from_str(
            r#"
            [routing]
            unmatched = "not_found"

            [domains."example.com".subdomains.api]
            servers = ["http://127.0.0.1:3000", "http://127.0.0.1:3001"]

            [domains."example.com".subdomains.empty]
            "#,
        )
        .unwrap();

        assert_eq!(config.routing.unmatched, UnmatchedRoute::NotFound);
        let domain = &config.domains["example.com"];
        assert_eq!(domain.subdomains["api"].servers.len(), 2);
        assert!(domain.subdomains["empty"].servers.is_empty());
    }

    #[test]
    fn test_unknown_unmatched_value_rejected() {
        let result: Result<ProxyConfig, _> = toml::from_str("[routing]\nunmatched = \"teapot\"\n");
        assert!(result.is_err());
    }
}
