//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     normalized ProxyConfig[]
//!     → router.rs (derive limiters, order hosts)
//!     → matcher.rs (compile exact / prefix / regexp rules)
//!     → Freeze as immutable RouteTable
//!
//! Request (dispatch layer):
//!     path → RouteTable::find → first matching Route or None
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same input always matches same route
//! - First match wins (declaration order)

pub mod matcher;
pub mod route;
pub mod router;

pub use matcher::MatchType;
pub use route::{Filter, PathRule, Route};
pub use router::RouteTable;
