//! Forward targets parsed from backend addresses.
//!
//! # Responsibilities
//! - Parse a configured backend URL into scheme, authority and base path
//! - Rewrite an inbound request's URI and Host header toward the target
//!
//! # Design Decisions
//! - Only absolute http/https URLs with a host are accepted
//! - Target base path and inbound path are joined with a single slash
//! - Target query and inbound query are concatenated with '&'

use std::fmt;
use std::str::FromStr;

use axum::http::request::Parts;
use axum::http::uri::{Authority, PathAndQuery, Scheme};
use axum::http::{header, HeaderValue, Uri};
use thiserror::Error;
use url::Url;

/// Why a backend address cannot be used as a forward target.
#[derive(Debug, Error)]
pub enum TargetError {
    #[error("unparsable URL: {0}")]
    Parse(#[from] url::ParseError),

    #[error("unsupported scheme {0:?}")]
    UnsupportedScheme(String),

    #[error("URL has no host")]
    MissingHost,

    #[error("invalid authority {0:?}")]
    InvalidAuthority(String),

    #[error("failed to build outbound URI: {0}")]
    Rewrite(#[from] axum::http::Error),
}

/// A backend the current request will be forwarded to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    scheme: Scheme,
    authority: Authority,
    base_path: String,
    query: Option<String>,
}

impl Target {
    /// Parse a backend address such as `http://127.0.0.1:3000`.
    pub fn parse(address: &str) -> Result<Self, TargetError> {
        let url = Url::parse(address)?;

        let scheme = match url.scheme() {
            "http" => Scheme::HTTP,
            "https" => Scheme::HTTPS,
            other => return Err(TargetError::UnsupportedScheme(other.to_string())),
        };

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or(TargetError::MissingHost)?;
        let authority = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        let authority =
            Authority::from_str(&authority).map_err(|_| TargetError::InvalidAuthority(authority))?;

        Ok(Self {
            scheme,
            authority,
            base_path: url.path().to_string(),
            query: url.query().map(str::to_string),
        })
    }

    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    /// Host and optional port; also used as the outbound `Host` header.
    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Build the outbound URI for an inbound request URI.
    pub fn outbound_uri(&self, inbound: &Uri) -> Result<Uri, TargetError> {
        let path = join_paths(&self.base_path, inbound.path());
        let target_query = self.query.as_deref().filter(|q| !q.is_empty());
        let inbound_query = inbound.query().filter(|q| !q.is_empty());
        let path_and_query = match (target_query, inbound_query) {
            (Some(a), Some(b)) => format!("{}?{}&{}", path, a, b),
            (Some(q), None) | (None, Some(q)) => format!("{}?{}", path, q),
            (None, None) => path,
        };
        let path_and_query = PathAndQuery::from_str(&path_and_query)
            .map_err(|e| TargetError::Rewrite(e.into()))?;

        Ok(Uri::builder()
            .scheme(self.scheme.clone())
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()?)
    }

    /// Point the request at this target: absolute URI plus `Host` header.
    pub fn rewrite(&self, parts: &mut Parts) -> Result<(), TargetError> {
        parts.uri = self.outbound_uri(&parts.uri)?;
        let host = HeaderValue::from_str(self.authority.as_str())
            .map_err(|e| TargetError::Rewrite(e.into()))?;
        parts.headers.insert(header::HOST, host);
        Ok(())
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}{}", self.scheme, self.authority, self.base_path)
    }
}

fn join_paths(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{}/{}", base, path),
        _ => format!("{}{}", base, path),
    }
}
