//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (host header)
//!     → host.rs (split into subdomain + domain)
//!     → table.rs (domain lookup, then subdomain lookup)
//!     → Return: backend address list or NoMatch
//!
//! Table Construction (at startup and on reload):
//!     [domains] config section
//!     → RoutingTable::from_config
//!     → Swapped into SharedRoutingTable
//! ```
//!
//! # Design Decisions
//! - Exact, case-sensitive matching; no wildcards or suffix matching
//! - Table immutable at runtime; reload replaces it wholesale
//! - Domain miss and subdomain miss are indistinguishable to callers

pub mod host;
pub mod table;

pub use host::{resolve, HostError, HostParts};
pub use table::{Domain, RoutingTable, SharedRoutingTable, Subdomain};
