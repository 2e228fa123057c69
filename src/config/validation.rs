//! Configuration normalization.
//!
//! # Responsibilities
//! - Normalize path match types (trim, lower-case, default to exact)
//! - Flag match types outside the supported set
//! - Make sure every route strips `Content-Encoding` from responses
//!
//! # Design Decisions
//! - Pure function: ProjectConfig → Normalized or every ValidationError found
//! - Unrecognized match types are kept by default; rejecting them is opt-in
//! - Observations are returned as diagnostics, never logged here

use thiserror::Error;

use crate::config::diagnostics::Diagnostics;
use crate::config::schema::{ProjectConfig, ProxyConfig};
use crate::routing::matcher::{MatchType, MATCH_TYPE_EXACT};

/// Response header every route strips.
pub const CONTENT_ENCODING: &str = "Content-Encoding";

/// What to do with a match type outside the supported set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum MatchTypePolicy {
    /// Report it and keep the value; the rule never matches.
    #[default]
    Preserve,
    /// Fail the load.
    Reject,
}

/// A configuration problem that fails the load under a strict policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("desc:[{route}], path:[{path}]: unrecognized matchType [{match_type}]")]
    UnknownMatchType {
        route: String,
        path: String,
        match_type: String,
    },

    #[error("desc:[{route}], path:[{path}]: invalid regular expression: {reason}")]
    InvalidPattern {
        route: String,
        path: String,
        reason: String,
    },
}

/// A normalized document and what was observed while normalizing it.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub config: ProjectConfig,
    pub diagnostics: Diagnostics,
}

/// Normalize every route of `config`.
pub fn normalize(mut config: ProjectConfig, policy: MatchTypePolicy) -> Result<Normalized, Vec<ValidationError>> {
    let mut diagnostics = Diagnostics::new();
    let mut errors = Vec::new();

    for route in &mut config.proxy_configs {
        normalize_route(route, policy, &mut diagnostics, &mut errors);
    }

    if errors.is_empty() {
        Ok(Normalized { config, diagnostics })
    } else {
        Err(errors)
    }
}

fn normalize_route(
    route: &mut ProxyConfig,
    policy: MatchTypePolicy,
    diagnostics: &mut Diagnostics,
    errors: &mut Vec<ValidationError>,
) {
    ensure_header(&mut route.filter.limit_resp_headers, CONTENT_ENCODING);
    diagnostics.info(
        &route.desc,
        None,
        format!(
            "init route, timeOut:[{}], limitHosts:[{}], limitQps:[{}], limitRespHeaders:{:?}",
            route.filter.time_out, route.filter.limit_hosts, route.filter.limit_qps, route.filter.limit_resp_headers
        ),
    );

    for rule in &mut route.paths {
        rule.match_type = normalize_match_type(&rule.match_type);

        if let MatchType::Unrecognized(raw) = MatchType::parse(&rule.match_type) {
            diagnostics.error(&route.desc, Some(&rule.path), format!("unrecognized matchType [{}]", raw));
            if policy == MatchTypePolicy::Reject {
                errors.push(ValidationError::UnknownMatchType {
                    route: route.desc.clone(),
                    path: rule.path.clone(),
                    match_type: raw,
                });
                continue;
            }
        }

        diagnostics.info(
            &route.desc,
            Some(&rule.path),
            format!("path rule registered, matchType:[{}]", rule.match_type),
        );
    }
}

/// Trim and lower-case a match type token, defaulting blank tokens to exact.
pub fn normalize_match_type(raw: &str) -> String {
    let token = raw.trim().to_lowercase();
    if token.is_empty() {
        MATCH_TYPE_EXACT.to_string()
    } else {
        token
    }
}

/// Append `header` unless an equal name (ignoring case) is already listed.
fn ensure_header(headers: &mut Vec<String>, header: &str) {
    if !headers.iter().any(|h| h.trim().eq_ignore_ascii_case(header)) {
        headers.push(header.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::diagnostics::Severity;
    use crate::config::schema::{FilterConfig, PathConfig};

    fn route(desc: &str, match_types: &[&str]) -> ProxyConfig {
        ProxyConfig {
            desc: desc.into(),
            paths: match_types
                .iter()
                .enumerate()
                .map(|(i, m)| PathConfig {
                    path: format!("/p{}", i),
                    match_type: m.to_string(),
                    remove: String::new(),
                })
                .collect(),
            ..Default::default()
        }
    }

    fn config(routes: Vec<ProxyConfig>) -> ProjectConfig {
        ProjectConfig {
            port: 8080,
            proxy_configs: routes,
        }
    }

    #[test]
    fn test_match_type_normalization() {
        let normalized = normalize(
            config(vec![route("r", &["", "  PREFIX  ", "RegExp", "exact"])]),
            MatchTypePolicy::Preserve,
        )
        .unwrap();

        let types: Vec<_> = normalized.config.proxy_configs[0]
            .paths
            .iter()
            .map(|p| p.match_type.as_str())
            .collect();
        assert_eq!(types, vec!["exact", "prefix", "regexp", "exact"]);
        assert!(!normalized.diagnostics.has_errors());
    }

    #[test]
    fn test_unknown_match_type_preserved() {
        let normalized = normalize(config(vec![route("r", &["bogus"])]), MatchTypePolicy::Preserve).unwrap();

        assert_eq!(normalized.config.proxy_configs[0].paths[0].match_type, "bogus");
        let errors: Vec<_> = normalized.diagnostics.with_severity(Severity::Error).collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path.as_deref(), Some("/p0"));
        assert!(errors[0].message.contains("bogus"));
    }

    #[test]
    fn test_unknown_match_type_rejected() {
        let errors = normalize(
            config(vec![route("a", &["Fuzzy", "prefix"]), route("b", &["glob"])]),
            MatchTypePolicy::Reject,
        )
        .unwrap_err();

        assert_eq!(
            errors,
            vec![
                ValidationError::UnknownMatchType {
                    route: "a".into(),
                    path: "/p0".into(),
                    match_type: "fuzzy".into(),
                },
                ValidationError::UnknownMatchType {
                    route: "b".into(),
                    path: "/p0".into(),
                    match_type: "glob".into(),
                },
            ]
        );
    }

    #[test]
    fn test_content_encoding_always_stripped() {
        let mut with_header = route("b", &[]);
        with_header.filter = FilterConfig {
            limit_resp_headers: vec!["Server".into(), "content-encoding".into()],
            ..Default::default()
        };

        let normalized = normalize(
            config(vec![route("a", &[]), with_header, ProxyConfig::default()]),
            MatchTypePolicy::Preserve,
        )
        .unwrap();

        let routes = &normalized.config.proxy_configs;
        assert_eq!(routes[0].filter.limit_resp_headers, vec![CONTENT_ENCODING.to_string()]);
        assert_eq!(
            routes[1].filter.limit_resp_headers,
            vec!["Server".to_string(), "content-encoding".to_string()]
        );
        assert_eq!(routes[2].filter.limit_resp_headers, vec![CONTENT_ENCODING.to_string()]);
    }

    #[test]
    fn test_normalize_twice_is_stable() {
        let once = normalize(config(vec![route("r", &[" Prefix", ""])]), MatchTypePolicy::Preserve).unwrap();
        let twice = normalize(once.config.clone(), MatchTypePolicy::Preserve).unwrap();
        assert_eq!(once.config, twice.config);
    }

    #[test]
    fn test_one_info_per_route_and_rule() {
        let normalized = normalize(
            config(vec![route("a", &["exact", "prefix"]), route("b", &["regexp"])]),
            MatchTypePolicy::Preserve,
        )
        .unwrap();
        assert_eq!(normalized.diagnostics.with_severity(Severity::Info).count(), 5);
    }
}
