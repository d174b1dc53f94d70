//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → access.rs (tier classification, key validation, secret check)
//!     → rate_limit.rs (fixed-window check against the counter store)
//!     → Pass to storage fetch
//! ```
//!
//! # Design Decisions
//! - Key validation happens before any storage call
//! - Rate limiting fails open on counter-store outage (configurable):
//!   availability of the gateway beats strict quota enforcement
//! - No trust in client input

pub mod access;
pub mod rate_limit;

pub use access::{classify, AccessTier, Classified};
pub use rate_limit::{Decision, RateLimiter};
