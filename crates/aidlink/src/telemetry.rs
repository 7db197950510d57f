//! Tracing bootstrap for the disbursement service.
//!
//! Filter precedence: an explicit `RUST_LOG` wins outright; otherwise the
//! configured level applies process-wide with the HTTP plumbing capped at
//! `info`, so gateway transfer and audit lines stay readable at `debug`.

use crate::config::TelemetryConfig;
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

/// Crates whose debug output drowns the disbursement log lines.
const QUIET_TARGETS: [&str; 2] = ["hyper", "tower"];

#[derive(Debug)]
pub enum TelemetryError {
    Directive { value: String, source: ParseError },
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::Directive { value, .. } => {
                write!(f, "invalid log level/filter '{value}'")
            }
            TelemetryError::Subscriber(err) => write!(f, "telemetry error: {err}"),
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::Directive { source, .. } => Some(source),
            TelemetryError::Subscriber(err) => Some(&**err),
        }
    }
}

fn build_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let mut directives = config.log_level.clone();
    for target in QUIET_TARGETS {
        directives.push_str(&format!(",{target}=info"));
    }

    EnvFilter::try_new(&directives).map_err(|source| TelemetryError::Directive {
        value: config.log_level.clone(),
        source,
    })
}

pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    tracing_subscriber::fmt()
        .with_env_filter(build_filter(config)?)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}
