//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Route derived with limitQps > 0
//!     → rate_limit.rs (one token bucket per route)
//!     → shared by every request handler on the route
//! ```
//!
//! # Design Decisions
//! - Limiters exist only for routes with a positive quota
//! - Refill rate and burst both equal the quota

pub mod rate_limit;

pub use rate_limit::RateLimiter;
