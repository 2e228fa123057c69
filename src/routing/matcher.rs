//! Path matching logic.
//!
//! # Responsibilities
//! - Name the supported match strategies
//! - Compile path rules into matchers once, at startup
//!
//! # Design Decisions
//! - Paths are matched case-sensitively
//! - Regular expressions are unanchored; anchor them in the pattern if needed
//! - An unrecognized match type compiles to no matcher and never matches

use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;

pub const MATCH_TYPE_EXACT: &str = "exact";
pub const MATCH_TYPE_PREFIX: &str = "prefix";
pub const MATCH_TYPE_REGEXP: &str = "regexp";

/// Strategy used to compare a request path with a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchType {
    Exact,
    Prefix,
    Regexp,
    /// A value outside the supported set, kept verbatim.
    Unrecognized(String),
}

impl MatchType {
    /// Classify an already normalized token.
    pub fn parse(token: &str) -> Self {
        match token {
            MATCH_TYPE_EXACT => MatchType::Exact,
            MATCH_TYPE_PREFIX => MatchType::Prefix,
            MATCH_TYPE_REGEXP => MatchType::Regexp,
            other => MatchType::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            MatchType::Exact => MATCH_TYPE_EXACT,
            MatchType::Prefix => MATCH_TYPE_PREFIX,
            MatchType::Regexp => MATCH_TYPE_REGEXP,
            MatchType::Unrecognized(raw) => raw,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, MatchType::Unrecognized(_))
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for MatchType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Trait for matching request paths against a compiled rule.
pub trait Matcher: Send + Sync + fmt::Debug {
    /// Returns true if the path matches this rule.
    fn matches(&self, path: &str) -> bool;
}

/// Matches one path exactly.
#[derive(Debug, Clone)]
pub struct ExactMatcher {
    path: String,
}

impl ExactMatcher {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Matcher for ExactMatcher {
    fn matches(&self, path: &str) -> bool {
        path == self.path
    }
}

/// Matches the request path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }
}

/// Matches a regular expression anywhere in the path.
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    pattern: Regex,
}

impl RegexMatcher {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }
}

impl Matcher for RegexMatcher {
    fn matches(&self, path: &str) -> bool {
        self.pattern.is_match(path)
    }
}

/// Compile a rule. Returns `Ok(None)` for unrecognized match types.
pub fn compile(path: &str, match_type: &MatchType) -> Result<Option<Box<dyn Matcher>>, regex::Error> {
    let matcher: Box<dyn Matcher> = match match_type {
        MatchType::Exact => Box::new(ExactMatcher::new(path)),
        MatchType::Prefix => Box::new(PathPrefixMatcher::new(path)),
        MatchType::Regexp => Box::new(RegexMatcher::new(path)?),
        MatchType::Unrecognized(_) => return Ok(None),
    };
    Ok(Some(matcher))
}
