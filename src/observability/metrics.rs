//! Metrics collection.
//!
//! # Metrics
//! - `mirror_config_source_attempts_total` (counter): candidate sources tried,
//!   by kind (`file`, `remote`) and outcome (`accepted`, `rejected`)
//! - `mirror_config_diagnostics_total` (counter): diagnostics emitted, by severity
//!
//! # Design Decisions
//! - Only the `metrics` facade is used; installing an exporter is up to the
//!   embedding service
//! - Without a recorder installed every call is a no-op

/// Record one attempt to load a configuration source.
pub fn record_source_attempt(kind: &'static str, accepted: bool) {
    let outcome = if accepted { "accepted" } else { "rejected" };
    metrics::counter!(
        "mirror_config_source_attempts_total",
        "kind" => kind,
        "outcome" => outcome
    )
    .increment(1);
}

/// Record one emitted diagnostic.
pub fn record_diagnostic(severity: &'static str) {
    metrics::counter!("mirror_config_diagnostics_total", "severity" => severity).increment(1);
}
