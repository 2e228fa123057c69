//! Diagnostics collected while normalizing and deriving configuration.
//!
//! Normalization and derivation never log on their own. They return
//! diagnostics and the caller decides where they go.

use std::fmt;

use crate::observability::metrics;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warn,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
        }
    }
}

/// A single observation about a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Description of the route concerned.
    pub route: String,
    /// Path rule concerned, if any.
    pub path: Option<String>,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "desc:[{}]", self.route)?;
        if let Some(path) = &self.path {
            write!(f, ", path:[{}]", path)?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Ordered list of diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, severity: Severity, route: &str, path: Option<&str>, message: impl Into<String>) {
        self.0.push(Diagnostic {
            severity,
            route: route.to_string(),
            path: path.map(str::to_string),
            message: message.into(),
        });
    }

    pub fn info(&mut self, route: &str, path: Option<&str>, message: impl Into<String>) {
        self.push(Severity::Info, route, path, message);
    }

    pub fn warn(&mut self, route: &str, path: Option<&str>, message: impl Into<String>) {
        self.push(Severity::Warn, route, path, message);
    }

    pub fn error(&mut self, route: &str, path: Option<&str>, message: impl Into<String>) {
        self.push(Severity::Error, route, path, message);
    }

    /// Append all diagnostics from `other`.
    pub fn extend(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Diagnostics of exactly the given severity.
    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter().filter(move |d| d.severity == severity)
    }

    pub fn has_errors(&self) -> bool {
        self.with_severity(Severity::Error).next().is_some()
    }

    /// Send every diagnostic to the tracing subscriber.
    pub fn emit(&self) {
        for d in &self.0 {
            let path = d.path.as_deref().unwrap_or("");
            match d.severity {
                Severity::Info => tracing::info!(desc = %d.route, path = %path, "{}", d.message),
                Severity::Warn => tracing::warn!(desc = %d.route, path = %path, "{}", d.message),
                Severity::Error => tracing::error!(desc = %d.route, path = %path, "{}", d.message),
            }
            metrics::record_diagnostic(d.severity.as_str());
        }
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
