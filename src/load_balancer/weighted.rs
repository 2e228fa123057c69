//! Weighted upstream host ordering.

use serde::Serialize;

/// An upstream host with its selection weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostTarget {
    host: String,
    weight: u32,
}

impl HostTarget {
    pub fn new(host: impl Into<String>, weight: u32) -> Self {
        Self {
            host: host.into(),
            weight,
        }
    }

    /// Address or base URL of the upstream.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }
}

/// Sort hosts by weight, heaviest first.
///
/// The sort is stable: hosts of equal weight keep their declaration order.
pub fn order_by_weight(hosts: &mut [HostTarget]) {
    hosts.sort_by(|a, b| b.weight.cmp(&a.weight));
}
