//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Route derived
//!     → weighted.rs (order hosts heaviest first)
//!     → dispatch layer selects among the ordered hosts
//! ```
//!
//! # Design Decisions
//! - Only the ordering is prepared here; selection happens per request
//!   outside this crate
//! - Ordering is stable so equal weights keep declaration order

pub mod weighted;

pub use weighted::HostTarget;
