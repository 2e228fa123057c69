//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve the configuration source
//! - Parse, normalize and derive the route table, once
//! - Apply the port override
//! - Decide, per policy, whether problems stop the process
//!
//! # Design Decisions
//! - Stages run in order on the calling task, nothing runs concurrently
//! - Fail open by default: an unusable source or document yields an empty
//!   table rather than an error
//! - The result is an `Arc<RouteTable>`; there is no way to mutate it

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::diagnostics::Diagnostics;
use crate::config::loader::{parse_document, parse_or_default, ConfigError, DocumentFormat};
use crate::config::source::{SourceError, SourceLocation, SourceResolver, SourceValidation, DEFAULT_FETCH_TIMEOUT};
use crate::config::validation::{normalize, MatchTypePolicy, ValidationError};
use crate::routing::router::RouteTable;

/// Environment variable overriding the listen port.
pub const ENV_PORT: &str = "MIRROR_PORT";

/// Environment variable holding the comma-separated source list.
pub const ENV_CONFIG_FILE: &str = "MIRROR_CONFIG_FILE";

/// Source list used when none is given.
pub const DEFAULT_CONFIG_SOURCES: &str = "config.yaml";

/// What to do when no source is usable or the document does not parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LoadPolicy {
    /// Log and continue with whatever was obtained.
    #[default]
    FailOpen,
    /// Abort startup.
    FailFast,
}

/// Inputs to the startup pipeline.
#[derive(Debug, Clone)]
pub struct StartupOptions {
    /// Comma-separated candidate locations.
    pub sources: String,
    /// Replaces the document's port when set.
    pub port_override: Option<u16>,
    pub fetch_timeout: Duration,
    pub validation: SourceValidation,
    pub load_policy: LoadPolicy,
    pub match_type_policy: MatchTypePolicy,
}

impl Default for StartupOptions {
    fn default() -> Self {
        Self {
            sources: DEFAULT_CONFIG_SOURCES.to_string(),
            port_override: None,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            validation: SourceValidation::default(),
            load_policy: LoadPolicy::default(),
            match_type_policy: MatchTypePolicy::default(),
        }
    }
}

impl StartupOptions {
    /// Options for `sources` with every other setting at its default.
    pub fn with_sources(sources: impl Into<String>) -> Self {
        Self {
            sources: sources.into(),
            ..Self::default()
        }
    }
}

/// Error aborting startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] ConfigError),

    #[error("{} configuration error(s), first: {}", .0.len(), .0.first().map(ToString::to_string).unwrap_or_default())]
    Validation(Vec<ValidationError>),
}

impl From<Vec<ValidationError>> for StartupError {
    fn from(errors: Vec<ValidationError>) -> Self {
        StartupError::Validation(errors)
    }
}

/// Result of a successful startup.
#[derive(Debug)]
pub struct Startup {
    pub table: Arc<RouteTable>,
    /// Location the document came from; `None` when nothing was loaded.
    pub source: Option<SourceLocation>,
    pub diagnostics: Diagnostics,
}

/// Resolve, parse, normalize and derive the configuration.
pub async fn load(options: &StartupOptions) -> Result<Startup, StartupError> {
    let resolver = SourceResolver::new(options.fetch_timeout, options.validation)?;

    let (content, source) = match resolver.resolve(&options.sources).await {
        Ok(resolved) => (resolved.content, Some(resolved.location)),
        Err(e) if options.load_policy == LoadPolicy::FailOpen => {
            tracing::error!(error = %e, "No usable configuration source, continuing with last content");
            match e.into_last_attempt() {
                Some((content, location)) => (content, Some(location)),
                None => (Vec::new(), None),
            }
        }
        Err(e) => return Err(e.into()),
    };

    let format = source.as_ref().map(SourceLocation::format).unwrap_or_default();
    let (table, diagnostics) = prepare(&content, format, options)?;

    Ok(Startup {
        table: Arc::new(table),
        source,
        diagnostics,
    })
}

/// Parse, normalize and derive already obtained content.
pub fn prepare(
    content: &[u8],
    format: DocumentFormat,
    options: &StartupOptions,
) -> Result<(RouteTable, Diagnostics), StartupError> {
    let mut config = match options.load_policy {
        LoadPolicy::FailOpen => parse_or_default(content, format),
        LoadPolicy::FailFast => parse_document(content, format)?,
    };

    if let Some(port) = options.port_override {
        config.port = i64::from(port);
    }

    let normalized = normalize(config, options.match_type_policy)?;
    let mut diagnostics = normalized.diagnostics;

    let derived = RouteTable::derive(normalized.config, options.match_type_policy)?;
    diagnostics.extend(derived.diagnostics);

    Ok((derived.table, diagnostics))
}
