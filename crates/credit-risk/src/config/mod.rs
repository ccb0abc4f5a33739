use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::scoring::{MAX_EXPLANATION_DEPTH, MIN_EXPLANATION_DEPTH};

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

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub scoring: ScoringConfig,
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
            scoring: ScoringConfig::from_env()?,
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

/// Resource bounds and storage locations for batch scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    pub max_batch_rows: usize,
    pub max_upload_bytes: usize,
    pub batch_timeout: Duration,
    pub explanation_depth: usize,
    pub upload_dir: PathBuf,
    pub results_dir: PathBuf,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            max_batch_rows: 10_000,
            max_upload_bytes: 10 * 1024 * 1024,
            batch_timeout: Duration::from_secs(30),
            explanation_depth: MIN_EXPLANATION_DEPTH,
            upload_dir: PathBuf::from("./uploads"),
            results_dir: PathBuf::from("./results"),
        }
    }
}

impl ScoringConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let max_batch_rows = parse_var("SCORING_MAX_BATCH_ROWS", defaults.max_batch_rows)?;
        if max_batch_rows == 0 {
            return Err(ConfigError::InvalidNumber {
                variable: "SCORING_MAX_BATCH_ROWS",
            });
        }

        let max_upload_bytes = parse_var("SCORING_MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?;
        let timeout_secs = parse_var("SCORING_TIMEOUT_SECS", defaults.batch_timeout.as_secs())?;

        let explanation_depth =
            parse_var("SCORING_EXPLANATION_DEPTH", defaults.explanation_depth)?;
        if !(MIN_EXPLANATION_DEPTH..=MAX_EXPLANATION_DEPTH).contains(&explanation_depth) {
            return Err(ConfigError::InvalidExplanationDepth(explanation_depth));
        }

        let upload_dir = env::var("SCORING_UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.upload_dir);
        let results_dir = env::var("SCORING_RESULTS_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.results_dir);

        Ok(Self {
            max_batch_rows,
            max_upload_bytes,
            batch_timeout: Duration::from_secs(timeout_secs),
            explanation_depth,
            upload_dir,
            results_dir,
        })
    }
}

fn parse_var<T: std::str::FromStr>(variable: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(variable) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { variable }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { variable: &'static str },
    InvalidExplanationDepth(usize),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { variable } => {
                write!(f, "{variable} must be a positive integer")
            }
            ConfigError::InvalidExplanationDepth(depth) => write!(
                f,
                "SCORING_EXPLANATION_DEPTH must be between {} and {} (got {})",
                MIN_EXPLANATION_DEPTH, MAX_EXPLANATION_DEPTH, depth
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::InvalidExplanationDepth(_) => None,
        }
    }
}
