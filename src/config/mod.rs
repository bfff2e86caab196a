use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

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
    pub pipeline: PipelineConfig,
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
            pipeline: PipelineConfig::from_env()?,
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

/// Knobs for the interview pipeline and its external dependencies.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub shortlist: ShortlistSettings,
    pub questions: QuestionSettings,
    pub resilience: ResilienceSettings,
    pub artifacts_dir: PathBuf,
}

impl PipelineConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            shortlist: ShortlistSettings {
                top_n_first: parse_env("APP_SHORTLIST_TOP_N", 5)?,
                min_score_first: parse_env("APP_SHORTLIST_MIN_SCORE", 0.35)?,
                top_n_wide: parse_env("APP_SHORTLIST_TOP_N_WIDE", 7)?,
                widen_factor: parse_env("APP_SHORTLIST_WIDEN_FACTOR", 0.8)?,
            },
            questions: QuestionSettings {
                bank_path: PathBuf::from(
                    env::var("APP_QUESTION_BANK")
                        .unwrap_or_else(|_| "data/question_bank.csv".to_string()),
                ),
                top_k_retrieve: parse_env("APP_RETRIEVE_TOP_K", 16)?,
                target_min: parse_env("APP_QUESTIONS_MIN", 8)?,
                target_max: parse_env("APP_QUESTIONS_MAX", 12)?,
                tailor_model: env::var("APP_TAILOR_MODEL")
                    .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            },
            resilience: ResilienceSettings {
                breaker_threshold: parse_env("APP_BREAKER_THRESHOLD", 3)?,
                breaker_cooldown: Duration::from_secs(parse_env(
                    "APP_BREAKER_COOLDOWN_SECS",
                    30,
                )?),
                retry_attempts: parse_env("APP_RETRY_ATTEMPTS", 3)?,
            },
            artifacts_dir: PathBuf::from(
                env::var("APP_ARTIFACTS_DIR").unwrap_or_else(|_| "artifacts".to_string()),
            ),
        })
    }
}

/// Shortlist selection parameters with their widening fallbacks.
#[derive(Debug, Clone)]
pub struct ShortlistSettings {
    pub top_n_first: usize,
    pub min_score_first: f64,
    pub top_n_wide: usize,
    pub widen_factor: f64,
}

/// Question retrieval and tailoring parameters.
#[derive(Debug, Clone)]
pub struct QuestionSettings {
    pub bank_path: PathBuf,
    pub top_k_retrieve: usize,
    pub target_min: usize,
    pub target_max: usize,
    pub tailor_model: String,
}

/// Circuit breaker and retry parameters for external calls.
#[derive(Debug, Clone)]
pub struct ResilienceSettings {
    pub breaker_threshold: u32,
    pub breaker_cooldown: Duration,
    pub retry_attempts: u32,
}

fn parse_env<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { var }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { var: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { var } => {
                write!(f, "{var} must parse to a numeric value")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidNumber { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
