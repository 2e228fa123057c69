//! API mirror configuration loader.
//!
//! Resolves the mirror configuration the same way the proxy does at startup
//! and reports the result.
//!
//! # Architecture Overview
//!
//! ```text
//!   MIRROR_CONFIG_FILE / --config
//!   "a.yaml, http://cfg/mirror.yaml"
//!              │
//!              ▼
//!   ┌──────────────────┐    ┌──────────┐    ┌────────────┐    ┌─────────────┐
//!   │  source resolver │───▶│  loader  │───▶│ normalizer │───▶│ route table │──▶ dispatch
//!   │ files / http GET │    │ yaml/toml│    │ matchTypes │    │ limiters,   │    layer
//!   └──────────────────┘    └──────────┘    │ headers    │    │ hosts,      │
//!                                           └────────────┘    │ matchers    │
//!                                                             └─────────────┘
//! ```

use clap::Parser;
use std::time::Duration;

use api_mirror::config::{MatchTypePolicy, SourceValidation};
use api_mirror::lifecycle::startup::{self, LoadPolicy, StartupOptions, DEFAULT_CONFIG_SOURCES, ENV_CONFIG_FILE, ENV_PORT};
use api_mirror::observability::logging::{init_logging, LogFormat};

#[derive(Parser)]
#[command(name = "api-mirror")]
#[command(about = "Resolve and check the API mirror configuration", long_about = None)]
struct Args {
    /// Comma-separated configuration sources (files or http URLs).
    #[arg(short, long, env = ENV_CONFIG_FILE, default_value = DEFAULT_CONFIG_SOURCES)]
    config: String,

    /// Listen port, overriding the document.
    #[arg(short, long, env = ENV_PORT)]
    port: Option<u16>,

    /// How candidate documents are validated.
    #[arg(long, value_enum, default_value_t = SourceValidation::Schema)]
    validation: SourceValidation,

    /// What to do with unrecognized path match types.
    #[arg(long, value_enum, default_value_t = MatchTypePolicy::Preserve)]
    match_type_policy: MatchTypePolicy,

    /// Abort when no source is usable or the document does not parse.
    #[arg(long)]
    fail_fast: bool,

    /// Timeout for remote sources, in milliseconds.
    #[arg(long, default_value_t = 5000)]
    fetch_timeout_ms: u64,

    #[arg(long, default_value = "info")]
    log_level: String,

    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    /// Print the derived route table as JSON.
    #[arg(long)]
    dump: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(&args.log_level, args.log_format)?;

    tracing::info!("api-mirror v{} starting", env!("CARGO_PKG_VERSION"));

    let options = StartupOptions {
        sources: args.config,
        port_override: args.port,
        fetch_timeout: Duration::from_millis(args.fetch_timeout_ms),
        validation: args.validation,
        load_policy: if args.fail_fast { LoadPolicy::FailFast } else { LoadPolicy::FailOpen },
        match_type_policy: args.match_type_policy,
    };

    let loaded = startup::load(&options).await?;
    loaded.diagnostics.emit();

    let table = &loaded.table;
    tracing::info!(
        source = %loaded.source.as_ref().map(ToString::to_string).unwrap_or_default(),
        port = table.port(),
        routes = table.routes().len(),
        "Configuration loaded"
    );

    for route in table.routes() {
        tracing::info!(
            desc = %route.desc(),
            configured = route.is_configured(),
            paths = route.paths().len(),
            hosts = route.hosts().len(),
            rate_limited = route.filter().limiter().is_some(),
            "Route ready"
        );
    }

    if args.dump {
        println!("{}", serde_json::to_string_pretty(&**table)?);
    }

    Ok(())
}
