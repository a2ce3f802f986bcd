//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Route matched → backend address list
//!     → BackendSelector::select
//!         - random.rs (uniform random pick)
//!     → Return one address or NoBackendsError
//! ```
//!
//! # Design Decisions
//! - Selectors are stateless: no affinity, weighting or rotation
//! - An empty list is an explicit error, never an index panic
//! - Selection borrows from the table snapshot; nothing is cloned

pub mod random;

use thiserror::Error;

pub use random::RandomSelector;

/// The address list for a route was empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no servers available")]
pub struct NoBackendsError;

/// Strategy for picking one backend address from a route's list.
pub trait BackendSelector: Send + Sync + std::fmt::Debug {
    /// Returns one of `servers`, or `NoBackendsError` if the list is empty.
    fn select<'a>(&self, servers: &'a [String]) -> Result<&'a str, NoBackendsError>;
}
