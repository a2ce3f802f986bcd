//! Host header resolution.
//!
//! # Responsibilities
//! - Strip an optional port from the host
//! - Split the host into (subdomain, domain) on the first dot
//!
//! # Design Decisions
//! - Matching is literal: no case folding, trailing-dot or IDN handling
//! - More than one colon is rejected (credentials, IPv6 literals)
//! - A host without a dot is all subdomain with an empty domain

use thiserror::Error;

/// Error produced when a host cannot be split into routing keys.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The host contains more than one colon.
    #[error("unsupported host format: {0:?}")]
    UnsupportedFormat(String),
}

/// Routing keys extracted from a host header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostParts<'a> {
    /// First dot-separated label.
    pub subdomain: &'a str,
    /// Remaining labels, joined by dots. Empty if none remain.
    pub domain: &'a str,
}

/// Split a host header value into subdomain and domain.
pub fn resolve(host: &str) -> Result<HostParts<'_>, HostError> {
    if host.matches(':').count() > 1 {
        return Err(HostError::UnsupportedFormat(host.to_string()));
    }

    let name = host.split_once(':').map_or(host, |(name, _port)| name);

    let (subdomain, domain) = name.split_once('.').unwrap_or((name, ""));
    Ok(HostParts { subdomain, domain })
}
