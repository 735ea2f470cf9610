use std::env;
use std::fmt;
use std::time::Duration;

/// Distinguishes runtime behavior for different stages of the interaction layer.
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

/// Top-level configuration for the interaction layer.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub classifier: ClassifierConfig,
    pub ui: UiConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let base_url =
            env::var("CARHUB_BASE_URL").unwrap_or_else(|_| "http://127.0.0.1:8000".to_string());
        let analyze_path =
            env::var("CARHUB_ANALYZE_PATH").unwrap_or_else(|_| "/analyze/".to_string());
        let classifier = ClassifierConfig {
            base_url: normalize_base_url(&base_url)?,
            analyze_path,
            request_timeout: millis_var("CARHUB_REQUEST_TIMEOUT_MS", 10_000)?,
            csrf_token: env::var("CARHUB_CSRF_TOKEN")
                .ok()
                .filter(|token| !token.trim().is_empty()),
        };

        let ui = UiConfig {
            notification_ttl: millis_var("CARHUB_NOTIFICATION_TTL_MS", 3_000)?,
            valuation_delay: millis_var("CARHUB_VALUATION_DELAY_MS", 1_500)?,
        };

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            classifier,
            ui,
            telemetry: TelemetryConfig { log_level },
        })
    }
}

fn millis_var(name: &'static str, default: u64) -> Result<Duration, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| ConfigError::InvalidNumber { var: name }),
        Err(_) => Ok(Duration::from_millis(default)),
    }
}

pub fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let has_scheme = trimmed.starts_with("http://") || trimmed.starts_with("https://");
    let host = trimmed.split_once("://").map(|(_, rest)| rest).unwrap_or("");
    if !has_scheme || host.is_empty() {
        return Err(ConfigError::InvalidBaseUrl {
            value: raw.to_string(),
        });
    }
    Ok(trimmed.to_string())
}

/// Where and how the classification call is issued.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub base_url: String,
    pub analyze_path: String,
    pub request_timeout: Duration,
    /// Anti-forgery token embedded in the hosting page, when one is available.
    pub csrf_token: Option<String>,
}

impl ClassifierConfig {
    pub fn endpoint(&self) -> String {
        if self.analyze_path.starts_with('/') {
            format!("{}{}", self.base_url, self.analyze_path)
        } else {
            format!("{}/{}", self.base_url, self.analyze_path)
        }
    }
}

/// Timing of the visible feedback primitives.
#[derive(Debug, Clone)]
pub struct UiConfig {
    pub notification_ttl: Duration,
    pub valuation_delay: Duration,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            notification_ttl: Duration::from_millis(3_000),
            valuation_delay: Duration::from_millis(1_500),
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
    InvalidNumber { var: &'static str },
    InvalidBaseUrl { value: String },
    MissingCsrfToken,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidNumber { var } => {
                write!(f, "{var} must be a non-negative number of milliseconds")
            }
            ConfigError::InvalidBaseUrl { value } => {
                write!(f, "CARHUB_BASE_URL '{value}' must be an http(s) origin")
            }
            ConfigError::MissingCsrfToken => {
                write!(f, "no anti-forgery token: set CARHUB_CSRF_TOKEN or pass --token")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for var in [
            "APP_ENV",
            "APP_LOG_LEVEL",
            "CARHUB_BASE_URL",
            "CARHUB_ANALYZE_PATH",
            "CARHUB_REQUEST_TIMEOUT_MS",
            "CARHUB_CSRF_TOKEN",
            "CARHUB_NOTIFICATION_TTL_MS",
            "CARHUB_VALUATION_DELAY_MS",
        ] {
            env::remove_var(var);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.classifier.endpoint(), "http://127.0.0.1:8000/analyze/");
        assert_eq!(config.classifier.request_timeout, Duration::from_secs(10));
        assert!(config.classifier.csrf_token.is_none());
        assert_eq!(config.ui.notification_ttl, Duration::from_secs(3));
        assert_eq!(config.ui.valuation_delay, Duration::from_millis(1_500));
        assert_eq!(config.telemetry.log_level, "info");
    }

    #[test]
    fn trailing_slash_is_dropped_from_base_url() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("CARHUB_BASE_URL", "https://cars.example.pk/");
        env::set_var("CARHUB_ANALYZE_PATH", "api/analyze/");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(
            config.classifier.endpoint(),
            "https://cars.example.pk/api/analyze/"
        );
        reset_env();
    }

    #[test]
    fn rejects_non_numeric_timeouts() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("CARHUB_NOTIFICATION_TTL_MS", "soon");
        let err = AppConfig::load().expect_err("invalid ttl");
        assert!(matches!(
            err,
            ConfigError::InvalidNumber {
                var: "CARHUB_NOTIFICATION_TTL_MS"
            }
        ));
        reset_env();
    }

    #[test]
    fn rejects_base_url_without_scheme() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("CARHUB_BASE_URL", "cars.example.pk");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
        reset_env();
    }
}
