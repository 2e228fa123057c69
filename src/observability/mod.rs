//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Startup pipeline produces:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing, pretty for terminals
//! - Metrics are cheap and no-ops without a recorder

pub mod logging;
pub mod metrics;
