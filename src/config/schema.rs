//! Configuration document definitions.
//!
//! These types mirror the on-disk document one to one. They are mutable and
//! only live between parsing and derivation; the dispatch layer never sees
//! them. All types derive Serde traits and default every field so partial
//! documents still parse.

use serde::{Deserialize, Serialize};

use crate::config::validation::CONTENT_ENCODING;

/// Root of a configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Listen port.
    pub port: i64,

    /// Route definitions, in declaration order.
    #[serde(rename = "proxyConfig")]
    pub proxy_configs: Vec<ProxyConfig>,
}

/// A named routing rule mapping paths to upstream hosts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Free-form description used in logs.
    pub desc: String,

    /// Path rules that select this route.
    pub paths: Vec<PathConfig>,

    /// Candidate upstream hosts.
    pub hosts: Vec<HostConfig>,

    /// Per-route policy.
    pub filter: FilterConfig,
}

impl ProxyConfig {
    /// Returns true if no field of the route was set.
    ///
    /// A blank route is what a `- {}` list entry deserializes to. The
    /// `Content-Encoding` entry added by normalization does not count, so the
    /// answer is the same before and after normalizing.
    pub fn is_blank(&self) -> bool {
        self.desc.is_empty()
            && self.paths.is_empty()
            && self.hosts.is_empty()
            && self.filter.is_blank()
    }
}

/// A single path rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PathConfig {
    /// Path, prefix or pattern depending on `match_type`.
    pub path: String,

    /// One of `exact`, `prefix`, `regexp` (case-insensitive, empty = exact).
    pub match_type: String,

    /// Part of the request path to strip before forwarding.
    pub remove: String,
}

/// An upstream host with its selection weight.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct HostConfig {
    /// Address or base URL of the upstream.
    pub host: String,

    /// Selection weight (higher is preferred).
    pub weight: i64,
}

/// Per-route policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterConfig {
    /// Upstream timeout in milliseconds (0 = none).
    pub time_out: i64,

    /// Maximum number of upstream hosts to use (0 = all).
    pub limit_hosts: i64,

    /// Requests-per-second quota (0 or negative = unlimited).
    pub limit_qps: i64,

    /// Response headers stripped before replying to the caller.
    pub limit_resp_headers: Vec<String>,
}

impl FilterConfig {
    fn is_blank(&self) -> bool {
        self.time_out == 0
            && self.limit_hosts == 0
            && self.limit_qps == 0
            && self
                .limit_resp_headers
                .iter()
                .all(|h| h.trim().eq_ignore_ascii_case(CONTENT_ENCODING))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_keys() {
        let yaml = r#"
port: 8080
proxyConfig:
  - desc: users
    paths:
      - path: /users
        matchType: Prefix
        remove: /users
    hosts:
      - host: http://10.0.0.1:9000
        weight: 3
    filter:
      timeOut: 1500
      limitHosts: 2
      limitQps: 50
      limitRespHeaders: [Server]
"#;
        let config: ProjectConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.proxy_configs.len(), 1);

        let route = &config.proxy_configs[0];
        assert_eq!(route.desc, "users");
        assert_eq!(route.paths[0].match_type, "Prefix");
        assert_eq!(route.paths[0].remove, "/users");
        assert_eq!(route.hosts[0].weight, 3);
        assert_eq!(route.filter.time_out, 1500);
        assert_eq!(route.filter.limit_hosts, 2);
        assert_eq!(route.filter.limit_qps, 50);
        assert_eq!(route.filter.limit_resp_headers, vec!["Server".to_string()]);
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let yaml = "port: 1\nmirror: true\nproxyConfig:\n  - desc: a\n    extra: 1\n";
        let config: ProjectConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.proxy_configs[0].desc, "a");
    }

    #[test]
    fn test_blank_route() {
        assert!(ProxyConfig::default().is_blank());

        let mut route = ProxyConfig::default();
        route.filter.limit_qps = 1;
        assert!(!route.is_blank());

        let route = ProxyConfig {
            desc: "x".into(),
            ..Default::default()
        };
        assert!(!route.is_blank());
    }

    #[test]
    fn test_blank_route_ignores_content_encoding() {
        let mut route = ProxyConfig::default();
        route.filter.limit_resp_headers = vec!["content-encoding".into()];
        assert!(route.is_blank());

        route.filter.limit_resp_headers.push("Server".into());
        assert!(!route.is_blank());
    }
}
