//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! comma-separated source list (files / http URLs)
//!     → source.rs (first candidate holding a usable document)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (normalize match types, mandatory headers)
//!     → routing::router (derive immutable RouteTable)
//!     → shared via Arc to the dispatch layer
//! ```
//!
//! # Design Decisions
//! - Config is immutable once derived; there is no reload
//! - All fields have defaults to allow minimal configs
//! - Normalization separates syntactic (serde) from semantic checks
//! - Every stage reports problems; policies decide whether they are fatal

pub mod diagnostics;
pub mod loader;
pub mod schema;
pub mod source;
pub mod validation;

pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use loader::{ConfigError, DocumentFormat};
pub use schema::{FilterConfig, HostConfig, PathConfig, ProjectConfig, ProxyConfig};
pub use source::{SourceError, SourceLocation, SourceResolver, SourceValidation};
pub use validation::{MatchTypePolicy, ValidationError};
