use crate::workflows::aid::ScreeningPolicy;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the disbursement service.
///
/// Process knobs use the `APP_` prefix; the screening thresholds, being a
/// policy decision rather than plumbing, use `AID_`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub screening: ScreeningConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            screening: ScreeningConfig::load()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Income ceilings for the preliminary eligibility screen, overridable per
/// deployment without a rebuild. Amounts are whole ringgit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreeningConfig {
    pub auto_approve_ceiling: u32,
    pub review_ceiling: u32,
}

impl ScreeningConfig {
    fn load() -> Result<Self, ConfigError> {
        let defaults = ScreeningPolicy::default();
        let auto_approve_ceiling =
            ceiling_var("AID_AUTO_APPROVE_CEILING", defaults.auto_approve_ceiling)?;
        let review_ceiling = ceiling_var("AID_REVIEW_CEILING", defaults.review_ceiling)?;

        if auto_approve_ceiling > review_ceiling {
            return Err(ConfigError::ScreeningOrder {
                auto_approve_ceiling,
                review_ceiling,
            });
        }

        Ok(Self {
            auto_approve_ceiling,
            review_ceiling,
        })
    }

    pub fn policy(&self) -> ScreeningPolicy {
        ScreeningPolicy {
            auto_approve_ceiling: self.auto_approve_ceiling,
            review_ceiling: self.review_ceiling,
        }
    }
}

fn ceiling_var(name: &'static str, default: u32) -> Result<u32, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidCeiling { name }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidCeiling { name: &'static str },
    ScreeningOrder { auto_approve_ceiling: u32, review_ceiling: u32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidCeiling { name } => {
                write!(f, "{name} must be a whole ringgit amount")
            }
            ConfigError::ScreeningOrder {
                auto_approve_ceiling,
                review_ceiling,
            } => write!(
                f,
                "AID_AUTO_APPROVE_CEILING ({auto_approve_ceiling}) must not exceed AID_REVIEW_CEILING ({review_ceiling})"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidCeiling { .. }
            | ConfigError::ScreeningOrder { .. } => None,
        }
    }
}
