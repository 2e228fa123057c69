//! Derived, read-only route definitions.
//!
//! Every type here is built once by [`RouteTable::derive`] and then shared
//! through `Arc`. Fields are private so nothing can change after startup; the
//! rate limiter is the only part with interior state.
//!
//! [`RouteTable::derive`]: crate::routing::router::RouteTable::derive

use serde::{Serialize, Serializer};
use std::sync::Arc;
use std::time::Duration;

use crate::load_balancer::weighted::HostTarget;
use crate::routing::matcher::{MatchType, Matcher};
use crate::security::rate_limit::RateLimiter;

/// A compiled path rule.
#[derive(Debug, Serialize)]
pub struct PathRule {
    path: String,
    match_type: MatchType,
    remove: Option<String>,
    #[serde(skip)]
    matcher: Option<Box<dyn Matcher>>,
}

impl PathRule {
    pub(crate) fn new(
        path: String,
        match_type: MatchType,
        remove: Option<String>,
        matcher: Option<Box<dyn Matcher>>,
    ) -> Self {
        Self {
            path,
            match_type,
            remove,
            matcher,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn match_type(&self) -> &MatchType {
        &self.match_type
    }

    /// Part of the request path to strip before forwarding.
    pub fn remove(&self) -> Option<&str> {
        self.remove.as_deref()
    }

    /// False when the rule could not be compiled.
    pub fn is_compiled(&self) -> bool {
        self.matcher.is_some()
    }

    /// Returns true if `request_path` is selected by this rule.
    pub fn matches(&self, request_path: &str) -> bool {
        self.matcher.as_ref().is_some_and(|m| m.matches(request_path))
    }
}

/// Per-route policy.
#[derive(Debug, Serialize)]
pub struct Filter {
    #[serde(serialize_with = "serialize_millis")]
    timeout: Option<Duration>,
    limit_hosts: Option<usize>,
    limit_qps: i64,
    strip_headers: Vec<String>,
    #[serde(skip)]
    limiter: Option<Arc<RateLimiter>>,
}

impl Filter {
    pub(crate) fn new(
        timeout: Option<Duration>,
        limit_hosts: Option<usize>,
        limit_qps: i64,
        strip_headers: Vec<String>,
        limiter: Option<Arc<RateLimiter>>,
    ) -> Self {
        Self {
            timeout,
            limit_hosts,
            limit_qps,
            strip_headers,
            limiter,
        }
    }

    /// Upstream timeout, if one was configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Maximum number of hosts to use, if limited.
    pub fn limit_hosts(&self) -> Option<usize> {
        self.limit_hosts
    }

    /// Configured requests-per-second quota.
    pub fn limit_qps(&self) -> i64 {
        self.limit_qps
    }

    /// Response headers to remove before replying.
    pub fn strip_headers(&self) -> &[String] {
        &self.strip_headers
    }

    /// Returns true if `header` is on the strip list (case-insensitive).
    pub fn strips(&self, header: &str) -> bool {
        self.strip_headers.iter().any(|h| h.eq_ignore_ascii_case(header))
    }

    /// Shared limiter, absent when the route is not rate limited.
    pub fn limiter(&self) -> Option<&Arc<RateLimiter>> {
        self.limiter.as_ref()
    }
}

fn serialize_millis<S: Serializer>(timeout: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
    match timeout {
        Some(t) => serializer.serialize_some(&(t.as_millis() as u64)),
        None => serializer.serialize_none(),
    }
}

/// A derived route.
#[derive(Debug, Serialize)]
pub struct Route {
    desc: String,
    configured: bool,
    paths: Vec<PathRule>,
    hosts: Vec<HostTarget>,
    filter: Filter,
}

impl Route {
    pub(crate) fn new(
        desc: String,
        configured: bool,
        paths: Vec<PathRule>,
        hosts: Vec<HostTarget>,
        filter: Filter,
    ) -> Self {
        Self {
            desc,
            configured,
            paths,
            hosts,
            filter,
        }
    }

    pub fn desc(&self) -> &str {
        &self.desc
    }

    /// False for an entry that left every field unset.
    pub fn is_configured(&self) -> bool {
        self.configured
    }

    pub fn paths(&self) -> &[PathRule] {
        &self.paths
    }

    /// Upstream hosts, heaviest first.
    pub fn hosts(&self) -> &[HostTarget] {
        &self.hosts
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    /// First path rule selecting `request_path`.
    pub fn matching_rule(&self, request_path: &str) -> Option<&PathRule> {
        self.paths.iter().find(|rule| rule.matches(request_path))
    }
}
