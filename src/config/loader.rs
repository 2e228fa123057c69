//! Configuration document parsing.

use std::path::Path;
use thiserror::Error;

use crate::config::schema::ProjectConfig;

/// Error type for configuration parsing.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("document is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("port {0} is not a valid listen port")]
    InvalidPort(i64),
}

/// Markup language of a configuration document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DocumentFormat {
    /// YAML (the default; JSON documents parse as YAML too).
    #[default]
    Yaml,
    Toml,
}

impl DocumentFormat {
    /// Guess the format from a file path or URL.
    pub fn from_location(location: &str) -> Self {
        let location = location.split(['?', '#']).next().unwrap_or(location);
        match Path::new(location).extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => DocumentFormat::Toml,
            _ => DocumentFormat::Yaml,
        }
    }
}

/// Parse a configuration document.
///
/// Unknown keys are ignored and missing keys take their zero value, so an
/// empty document yields `ProjectConfig::default()`.
pub fn parse_document(content: &[u8], format: DocumentFormat) -> Result<ProjectConfig, ConfigError> {
    let text = std::str::from_utf8(content)?;
    if text.trim().is_empty() {
        return Ok(ProjectConfig::default());
    }

    let config = match format {
        DocumentFormat::Yaml => serde_yaml::from_str(text)?,
        DocumentFormat::Toml => toml::from_str(text)?,
    };
    Ok(config)
}

/// Parse a document, falling back to the zero configuration on failure.
pub fn parse_or_default(content: &[u8], format: DocumentFormat) -> ProjectConfig {
    match parse_document(content, format) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to parse configuration, continuing with no routes");
            ProjectConfig::default()
        }
    }
}

/// Parse a document and require a usable listen port.
///
/// Used to decide whether a candidate source holds a real configuration.
pub fn validate_document(content: &[u8], format: DocumentFormat) -> Result<ProjectConfig, ConfigError> {
    let config = parse_document(content, format)?;
    if !(1..=i64::from(u16::MAX)).contains(&config.port) {
        return Err(ConfigError::InvalidPort(config.port));
    }
    Ok(config)
}
