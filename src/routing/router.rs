//! Route table derivation and lookup.
//!
//! # Responsibilities
//! - Turn a normalized document into an immutable route table
//! - Build one rate limiter per rate-limited route
//! - Order each route's hosts heaviest first
//! - Compile path rules into matchers
//! - Look up the route for a request path
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - First match wins, in declaration order
//! - Deriving twice from the same document gives equal tables, each with its
//!   own limiter instances

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::config::diagnostics::Diagnostics;
use crate::config::schema::{FilterConfig, HostConfig, PathConfig, ProjectConfig, ProxyConfig};
use crate::config::validation::{MatchTypePolicy, ValidationError};
use crate::load_balancer::weighted::{order_by_weight, HostTarget};
use crate::routing::matcher::{compile, MatchType};
use crate::routing::route::{Filter, PathRule, Route};
use crate::security::rate_limit::RateLimiter;

/// The complete, read-only routing configuration handed to the dispatch layer.
#[derive(Debug, Serialize)]
pub struct RouteTable {
    port: u16,
    routes: Vec<Route>,
}

/// A derived table and what was observed while deriving it.
#[derive(Debug)]
pub struct Derived {
    pub table: RouteTable,
    pub diagnostics: Diagnostics,
}

impl RouteTable {
    /// Derive the runtime table from a normalized document.
    ///
    /// Out-of-range ports become 0 with a warning.
    pub fn derive(config: ProjectConfig, policy: MatchTypePolicy) -> Result<Derived, Vec<ValidationError>> {
        let mut diagnostics = Diagnostics::new();
        let mut errors = Vec::new();

        let port = u16::try_from(config.port).unwrap_or_else(|_| {
            diagnostics.warn("", None, format!("port [{}] is out of range, using 0", config.port));
            0
        });
        let routes = config
            .proxy_configs
            .into_iter()
            .map(|route| derive_route(route, policy, &mut diagnostics, &mut errors))
            .collect();

        if errors.is_empty() {
            Ok(Derived {
                table: RouteTable { port, routes },
                diagnostics,
            })
        } else {
            Err(errors)
        }
    }

    /// Listen port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// All routes in declaration order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// First configured route with a rule selecting `request_path`.
    pub fn find(&self, request_path: &str) -> Option<&Route> {
        self.routes
            .iter()
            .filter(|route| route.is_configured())
            .find(|route| route.matching_rule(request_path).is_some())
    }
}

fn derive_route(
    route: ProxyConfig,
    policy: MatchTypePolicy,
    diagnostics: &mut Diagnostics,
    errors: &mut Vec<ValidationError>,
) -> Route {
    let configured = !route.is_blank();
    let desc = route.desc;

    let paths = route
        .paths
        .into_iter()
        .map(|rule| derive_path_rule(&desc, rule, policy, diagnostics, errors))
        .collect();

    let mut hosts: Vec<HostTarget> = route
        .hosts
        .into_iter()
        .map(|host| derive_host(&desc, host, diagnostics))
        .collect();
    order_by_weight(&mut hosts);

    let filter = derive_filter(route.filter);
    if let Some(limiter) = filter.limiter() {
        diagnostics.info(
            &desc,
            None,
            format!("rate limiter created, rate:[{}], burst:[{}]", limiter.rate(), limiter.burst()),
        );
    }

    Route::new(desc, configured, paths, hosts, filter)
}

fn derive_path_rule(
    desc: &str,
    rule: PathConfig,
    policy: MatchTypePolicy,
    diagnostics: &mut Diagnostics,
    errors: &mut Vec<ValidationError>,
) -> PathRule {
    let match_type = MatchType::parse(&rule.match_type);
    let matcher = match compile(&rule.path, &match_type) {
        Ok(matcher) => matcher,
        Err(e) => {
            diagnostics.error(desc, Some(&rule.path), format!("invalid regular expression: {}", e));
            if policy == MatchTypePolicy::Reject {
                errors.push(ValidationError::InvalidPattern {
                    route: desc.to_string(),
                    path: rule.path.clone(),
                    reason: e.to_string(),
                });
            }
            None
        }
    };
    let remove = Some(rule.remove).filter(|r| !r.is_empty());

    PathRule::new(rule.path, match_type, remove, matcher)
}

fn derive_host(desc: &str, host: HostConfig, diagnostics: &mut Diagnostics) -> HostTarget {
    let weight = if host.weight < 0 {
        diagnostics.warn(
            desc,
            None,
            format!("host [{}] has negative weight [{}], using 0", host.host, host.weight),
        );
        0
    } else {
        u32::try_from(host.weight).unwrap_or(u32::MAX)
    };
    HostTarget::new(host.host, weight)
}

fn derive_filter(filter: FilterConfig) -> Filter {
    let timeout = u64::try_from(filter.time_out)
        .ok()
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis);
    let limit_hosts = usize::try_from(filter.limit_hosts).ok().filter(|n| *n > 0);
    let limiter = RateLimiter::per_second(filter.limit_qps).map(Arc::new);

    Filter::new(
        timeout,
        limit_hosts,
        filter.limit_qps,
        filter.limit_resp_headers,
        limiter,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::diagnostics::Severity;

    fn host(name: &str, weight: i64) -> HostConfig {
        HostConfig {
            host: name.into(),
            weight,
        }
    }

    fn path(p: &str, match_type: &str) -> PathConfig {
        PathConfig {
            path: p.into(),
            match_type: match_type.into(),
            remove: String::new(),
        }
    }

    fn derive(routes: Vec<ProxyConfig>) -> Derived {
        RouteTable::derive(
            ProjectConfig {
                port: 8080,
                proxy_configs: routes,
            },
            MatchTypePolicy::Preserve,
        )
        .unwrap()
    }

    #[test]
    fn test_hosts_ordered_by_weight() {
        let derived = derive(vec![ProxyConfig {
            desc: "r".into(),
            hosts: vec![host("a", 1), host("b", 5), host("c", 3)],
            ..Default::default()
        }]);
        let weights: Vec<_> = derived.table.routes()[0].hosts().iter().map(|h| h.weight()).collect();
        assert_eq!(weights, vec![5, 3, 1]);
    }

    #[test]
    fn test_negative_weight_clamped() {
        let derived = derive(vec![ProxyConfig {
            desc: "r".into(),
            hosts: vec![host("a", -4), host("b", 2)],
            ..Default::default()
        }]);
        let hosts = derived.table.routes()[0].hosts();
        assert_eq!(hosts[1].host(), "a");
        assert_eq!(hosts[1].weight(), 0);
        assert_eq!(derived.diagnostics.with_severity(Severity::Warn).count(), 1);
    }

    #[test]
    fn test_limiter_only_for_positive_quota() {
        let limited = |qps| ProxyConfig {
            desc: format!("qps{}", qps),
            filter: FilterConfig {
                limit_qps: qps,
                ..Default::default()
            },
            ..Default::default()
        };
        let derived = derive(vec![limited(10), limited(0), limited(-1)]);
        let routes = derived.table.routes();

        let limiter = routes[0].filter().limiter().unwrap();
        assert_eq!(limiter.rate(), 10.0);
        assert_eq!(limiter.burst(), 10);
        assert!(routes[1].filter().limiter().is_none());
        assert!(routes[2].filter().limiter().is_none());
    }

    #[test]
    fn test_filter_fields() {
        let derived = derive(vec![ProxyConfig {
            desc: "r".into(),
            filter: FilterConfig {
                time_out: 1500,
                limit_hosts: 2,
                limit_qps: 0,
                limit_resp_headers: vec!["Server".into()],
            },
            ..Default::default()
        }]);
        let filter = derived.table.routes()[0].filter();
        assert_eq!(filter.timeout(), Some(Duration::from_millis(1500)));
        assert_eq!(filter.limit_hosts(), Some(2));
        assert!(filter.strips("server"));

        let derived = derive(vec![ProxyConfig {
            desc: "r".into(),
            filter: FilterConfig {
                time_out: -1,
                limit_hosts: 0,
                ..Default::default()
            },
            ..Default::default()
        }]);
        let filter = derived.table.routes()[0].filter();
        assert_eq!(filter.timeout(), None);
        assert_eq!(filter.limit_hosts(), None);
    }

    #[test]
    fn test_invalid_pattern() {
        let route = ProxyConfig {
            desc: "r".into(),
            paths: vec![path("(", "regexp"), path("/ok", "prefix")],
            ..Default::default()
        };

        let derived = derive(vec![route.clone()]);
        let rules = derived.table.routes()[0].paths();
        assert!(!rules[0].is_compiled());
        assert!(rules[1].is_compiled());
        assert!(derived.diagnostics.has_errors());

        let errors = RouteTable::derive(
            ProjectConfig {
                port: 1,
                proxy_configs: vec![route],
            },
            MatchTypePolicy::Reject,
        )
        .unwrap_err();
        assert!(matches!(&errors[0], ValidationError::InvalidPattern { path, .. } if path == "("));
    }

    #[test]
    fn test_find_skips_unconfigured() {
        let derived = derive(vec![
            ProxyConfig::default(),
            ProxyConfig {
                desc: "api".into(),
                paths: vec![path("/api", "prefix"), path("/health", "exact")],
                ..Default::default()
            },
            ProxyConfig {
                desc: "regex".into(),
                paths: vec![path(r"^/v\d+/", "regexp")],
                ..Default::default()
            },
        ]);
        let table = derived.table;

        assert!(!table.routes()[0].is_configured());
        assert_eq!(table.find("/api/users").unwrap().desc(), "api");
        assert_eq!(table.find("/health").unwrap().desc(), "api");
        assert!(table.find("/health/deep").is_none());
        assert_eq!(table.find("/v2/items").unwrap().desc(), "regex");
    }

    #[test]
    fn test_port_out_of_range() {
        let derived = RouteTable::derive(
            ProjectConfig {
                port: 70000,
                proxy_configs: vec![],
            },
            MatchTypePolicy::Preserve,
        )
        .unwrap();
        assert_eq!(derived.table.port(), 0);

        let warnings: Vec<_> = derived.diagnostics.with_severity(Severity::Warn).collect();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("70000"));

        assert!(derive(vec![]).diagnostics.is_empty());
    }

    #[test]
    fn test_remove_kept_when_set() {
        let derived = derive(vec![ProxyConfig {
            desc: "r".into(),
            paths: vec![
                PathConfig {
                    path: "/svc".into(),
                    match_type: "prefix".into(),
                    remove: "/svc".into(),
                },
                path("/x", "exact"),
            ],
            ..Default::default()
        }]);
        let rules = derived.table.routes()[0].paths();
        assert_eq!(rules[0].remove(), Some("/svc"));
        assert_eq!(rules[1].remove(), None);
    }
}
