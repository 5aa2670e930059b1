use std::env;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://openplzapi.org/de";
pub const DEFAULT_DEBOUNCE_MS: u64 = 1000;
pub const DEFAULT_MIN_QUERY_LEN: usize = 3;

/// Distinguishes runtime behavior for different stages of the tool.
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

/// Top-level configuration for the lookup tool.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub directory: DirectoryConfig,
    pub lookup: LookupConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let base_url =
            env::var("PLZ_API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let directory = DirectoryConfig::new(base_url)?;

        let debounce_ms = match env::var("PLZ_DEBOUNCE_MS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidDebounce { value: raw })?,
            Err(_) => DEFAULT_DEBOUNCE_MS,
        };

        let min_query_len = match env::var("PLZ_MIN_QUERY_LEN") {
            Ok(raw) => match raw.trim().parse::<usize>() {
                Ok(len) if len > 0 => len,
                _ => return Err(ConfigError::InvalidMinQueryLength { value: raw }),
            },
            Err(_) => DEFAULT_MIN_QUERY_LEN,
        };

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            directory,
            lookup: LookupConfig {
                debounce: Duration::from_millis(debounce_ms),
                min_query_len,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Location of the OpenPLZ-compatible address directory.
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    pub base_url: String,
}

impl DirectoryConfig {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ConfigError> {
        let base_url = base_url.into();
        let trimmed = base_url.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl { value: base_url });
        }

        Ok(Self {
            base_url: trimmed.to_string(),
        })
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Debounce and length-gate settings for the lookup controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupConfig {
    pub debounce: Duration,
    pub min_query_len: usize,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            min_query_len: DEFAULT_MIN_QUERY_LEN,
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidBaseUrl { value: String },
    InvalidDebounce { value: String },
    InvalidMinQueryLength { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidBaseUrl { value } => {
                write!(f, "PLZ_API_BASE_URL must be an http(s) URL, got '{value}'")
            }
            ConfigError::InvalidDebounce { value } => {
                write!(f, "PLZ_DEBOUNCE_MS must be a whole number of milliseconds, got '{value}'")
            }
            ConfigError::InvalidMinQueryLength { value } => {
                write!(f, "PLZ_MIN_QUERY_LEN must be a positive integer, got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
