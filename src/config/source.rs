//! Configuration source resolution.
//!
//! # Responsibilities
//! - Split a comma-separated source list into files and remote URLs
//! - Try each candidate in order, stopping at the first usable one
//! - Hand back the last attempted content when nothing qualifies
//!
//! # Design Decisions
//! - A failed candidate is never retried; the next one is tried instead
//! - Remote fetches are bounded by a timeout, local reads are not
//! - HTTP status alone does not decide acceptance, the body does

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::config::loader::{validate_document, ConfigError, DocumentFormat};
use crate::observability::metrics;

/// Default bound on a remote fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_millis(5000);

/// Remote bodies of this many bytes or fewer are rejected outright.
const MIN_REMOTE_BODY_LEN: usize = 10;

/// Body returned by config servers to signal a failed lookup.
const REMOTE_FAILURE_MARKER: &[u8] = b"httpError";

/// Key every configuration document is expected to carry.
const REQUIRED_KEY: &[u8] = b"port";

/// A single candidate location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    /// Fetched with an HTTP GET.
    Remote(String),
    /// Read from the local filesystem.
    File(PathBuf),
}

impl SourceLocation {
    /// Classify a raw list entry. Returns `None` for blank entries.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            None
        } else if raw.starts_with("http") {
            Some(SourceLocation::Remote(raw.to_string()))
        } else {
            Some(SourceLocation::File(PathBuf::from(raw)))
        }
    }

    /// Document format implied by the location.
    pub fn format(&self) -> DocumentFormat {
        match self {
            SourceLocation::Remote(url) => DocumentFormat::from_location(url),
            SourceLocation::File(path) => DocumentFormat::from_location(&path.to_string_lossy()),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            SourceLocation::Remote(_) => "remote",
            SourceLocation::File(_) => "file",
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceLocation::Remote(url) => write!(f, "{}", url),
            SourceLocation::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Split a comma-separated source list, skipping blank entries.
pub fn parse_source_list(list: &str) -> Vec<SourceLocation> {
    list.split(',').filter_map(SourceLocation::parse).collect()
}

/// How candidate content is judged to be a configuration document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SourceValidation {
    /// Content merely has to mention `port`.
    Heuristic,
    /// Content has to parse and carry a listen port in 1..=65535.
    #[default]
    Schema,
}

/// Why a candidate was not accepted.
#[derive(Debug, Error)]
pub enum Rejection {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("content is empty")]
    Empty,

    #[error("body of {0} bytes is too short")]
    TooShort(usize),

    #[error("server returned the failure marker")]
    FailureMarker,

    #[error("content does not mention a port")]
    MissingPort,

    #[error("content is not a usable document: {0}")]
    Invalid(#[from] ConfigError),
}

/// Error returned when no candidate yields a usable document.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("no configuration sources given")]
    NoSources,

    #[error("none of {attempted} configuration source(s) usable, last tried {location}: {reason}")]
    Exhausted {
        attempted: usize,
        location: SourceLocation,
        reason: Rejection,
        /// Whatever the last candidate produced, possibly empty.
        content: Vec<u8>,
    },
}

impl SourceError {
    /// Content and location of the last attempted candidate, for callers that
    /// carry on regardless.
    pub fn into_last_attempt(self) -> Option<(Vec<u8>, SourceLocation)> {
        match self {
            SourceError::NoSources => None,
            SourceError::Exhausted { location, content, .. } => Some((content, location)),
        }
    }
}

/// Content of the first accepted candidate.
#[derive(Debug, Clone)]
pub struct ResolvedSource {
    pub content: Vec<u8>,
    pub location: SourceLocation,
}

/// Resolves a source list to a configuration document.
#[derive(Debug, Clone)]
pub struct SourceResolver {
    client: reqwest::Client,
    validation: SourceValidation,
}

impl SourceResolver {
    /// Create a resolver whose remote fetches give up after `fetch_timeout`.
    pub fn new(fetch_timeout: Duration, validation: SourceValidation) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(fetch_timeout).build()?;
        Ok(Self::with_client(client, validation))
    }

    /// Create a resolver around a preconfigured client. The client's own
    /// timeout bounds remote fetches.
    pub fn with_client(client: reqwest::Client, validation: SourceValidation) -> Self {
        Self { client, validation }
    }

    /// Return the first candidate of `list` whose content is accepted.
    pub async fn resolve(&self, list: &str) -> Result<ResolvedSource, SourceError> {
        let candidates = parse_source_list(list);
        let attempted = candidates.len();
        let mut last = None;

        for location in candidates {
            let (content, outcome) = self.load(&location).await;
            metrics::record_source_attempt(location.kind(), outcome.is_ok());

            match outcome {
                Ok(()) => {
                    tracing::info!(source = %location, "Configuration source loaded");
                    return Ok(ResolvedSource { content, location });
                }
                Err(reason) => {
                    tracing::error!(source = %location, reason = %reason, "Configuration source rejected");
                    last = Some((location, reason, content));
                }
            }
        }

        match last {
            Some((location, reason, content)) => Err(SourceError::Exhausted {
                attempted,
                location,
                reason,
                content,
            }),
            None => Err(SourceError::NoSources),
        }
    }

    /// Load one candidate, returning whatever content was obtained alongside
    /// the verdict.
    async fn load(&self, location: &SourceLocation) -> (Vec<u8>, Result<(), Rejection>) {
        let content = match location {
            SourceLocation::Remote(url) => self.fetch(url).await,
            SourceLocation::File(path) => tokio::fs::read(path).await.map_err(Rejection::from),
        };
        match content {
            Ok(content) => {
                let verdict = self.accept(location, &content);
                (content, verdict)
            }
            Err(reason) => (Vec::new(), Err(reason)),
        }
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, Rejection> {
        let response = self.client.get(url).send().await?;
        tracing::debug!(source = %url, status = %response.status(), "Remote configuration fetched");
        Ok(response.bytes().await?.to_vec())
    }

    fn accept(&self, location: &SourceLocation, content: &[u8]) -> Result<(), Rejection> {
        if content.is_empty() {
            return Err(Rejection::Empty);
        }
        if let SourceLocation::Remote(_) = location {
            if content.len() <= MIN_REMOTE_BODY_LEN {
                return Err(Rejection::TooShort(content.len()));
            }
            if content == REMOTE_FAILURE_MARKER {
                return Err(Rejection::FailureMarker);
            }
        }

        match self.validation {
            SourceValidation::Heuristic => {
                if content.windows(REQUIRED_KEY.len()).any(|w| w == REQUIRED_KEY) {
                    Ok(())
                } else {
                    Err(Rejection::MissingPort)
                }
            }
            SourceValidation::Schema => {
                validate_document(content, location.format())?;
                Ok(())
            }
        }
    }
}
