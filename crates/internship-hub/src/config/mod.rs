use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use crate::workflows::placement::PlacementPolicy;

/// Deployment stage, only reported in the startup log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Everything the service binary needs before it opens the data directory.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub storage: StorageConfig,
    pub policy: PlacementPolicy,
}

impl AppConfig {
    /// Reads `.env` (if present) and then the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let text = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port = text("APP_PORT", "3000")
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        Ok(Self {
            environment: AppEnvironment::parse(&text("APP_ENV", "development")),
            server: ServerConfig {
                host: text("APP_HOST", "127.0.0.1"),
                port,
            },
            telemetry: TelemetryConfig {
                log_level: text("APP_LOG_LEVEL", "info"),
            },
            storage: StorageConfig {
                data_dir: PathBuf::from(text("APP_DATA_DIR", "data")),
            },
            policy: policy_from(&lookup)?,
        })
    }
}

fn policy_from(lookup: &impl Fn(&str) -> Option<String>) -> Result<PlacementPolicy, ConfigError> {
    let defaults = PlacementPolicy::default();
    Ok(PlacementPolicy {
        max_active_applications: limit(
            lookup,
            "PLACEMENT_MAX_ACTIVE_APPLICATIONS",
            defaults.max_active_applications,
        )?,
        max_postings_per_representative: limit(
            lookup,
            "PLACEMENT_MAX_POSTINGS",
            defaults.max_postings_per_representative,
        )?,
        max_slots: limit(lookup, "PLACEMENT_MAX_SLOTS", defaults.max_slots)?,
        junior_year_limit: limit(
            lookup,
            "PLACEMENT_JUNIOR_YEAR_LIMIT",
            defaults.junior_year_limit,
        )?,
    })
}

fn limit<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(var) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { var, value }),
        None => Ok(default),
    }
}

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
        let ip: IpAddr = self.host.parse()?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Directory holding the five record files.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("APP_PORT must be a valid u16")]
    InvalidPort,
    #[error("APP_HOST must parse to an IPv4 or IPv6 address")]
    InvalidHost(#[from] std::net::AddrParseError),
    #[error("{var} must be a non-negative integer (got '{value}')")]
    InvalidNumber { var: &'static str, value: String },
}
