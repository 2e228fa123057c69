//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Resolve source → Parse → Normalize → Derive → Arc<RouteTable>
//! ```
//!
//! # Design Decisions
//! - Ordered startup: configuration is complete before traffic is served
//! - Runs exactly once per process

pub mod startup;

pub use startup::{load, prepare, LoadPolicy, Startup, StartupError, StartupOptions};
