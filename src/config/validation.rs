//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and log level
//! - Reject routes the host resolver can never produce
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Empty server lists and bad backend URLs are allowed; they have
//!   defined per-request outcomes (503 / 500)

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ProxyConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    InvalidBindAddress(String),

    #[error("observability.metrics_address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),

    #[error("observability.log_level {0:?} is not one of trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("domain {0:?} contains ':' and can never match a host")]
    UnreachableDomain(String),

    #[error("subdomain {subdomain:?} of domain {domain:?} contains '.' or ':' and can never match a host")]
    UnreachableSubdomain { domain: String, subdomain: String },
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    let observability = &config.observability;
    if observability.metrics_enabled && observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidMetricsAddress(
            observability.metrics_address.clone(),
        ));
    }

    if !LOG_LEVELS.contains(&observability.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::InvalidLogLevel(observability.log_level.clone()));
    }

    for (domain, domain_config) in &config.domains {
        if domain.contains(':') {
            errors.push(ValidationError::UnreachableDomain(domain.clone()));
        }
        for subdomain in domain_config.subdomains.keys() {
            if subdomain.contains(|c: char| c == '.' || c == ':') {
                errors.push(ValidationError::UnreachableSubdomain {
                    domain: domain.clone(),
                    subdomain: subdomain.clone(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
