use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::assessment::ScoringConfig;

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
            &env::var("NIS2_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("NIS2_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("NIS2_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("NIS2_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let defaults = ScoringConfig::default();
        let scoring = ScoringConfig {
            gap_threshold: dial("NIS2_GAP_THRESHOLD", defaults.gap_threshold)?,
            attention_threshold: dial("NIS2_ATTENTION_THRESHOLD", defaults.attention_threshold)?,
            category_focus_count: dial("NIS2_FOCUS_CATEGORIES", defaults.category_focus_count)?,
            max_recommendations: dial("NIS2_MAX_RECOMMENDATIONS", defaults.max_recommendations)?,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            scoring,
        })
    }
}

fn dial<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidDial { name }),
        Err(_) => Ok(default),
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidDial { name: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "NIS2_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "NIS2_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidDial { name } => {
                write!(f, "{name} must be a non-negative integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidDial { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}

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
        env::remove_var("NIS2_ENV");
        env::remove_var("NIS2_HOST");
        env::remove_var("NIS2_PORT");
        env::remove_var("NIS2_LOG_LEVEL");
        env::remove_var("NIS2_GAP_THRESHOLD");
        env::remove_var("NIS2_ATTENTION_THRESHOLD");
        env::remove_var("NIS2_FOCUS_CATEGORIES");
        env::remove_var("NIS2_MAX_RECOMMENDATIONS");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.scoring, ScoringConfig::default());
    }

    #[test]
    fn scoring_dials_come_from_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("NIS2_MAX_RECOMMENDATIONS", "5");
        env::set_var("NIS2_GAP_THRESHOLD", "40");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.scoring.max_recommendations, 5);
        assert_eq!(config.scoring.gap_threshold, 40);
        reset_env();
    }

    #[test]
    fn invalid_dial_is_rejected() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("NIS2_MAX_RECOMMENDATIONS", "plenty");
        let result = AppConfig::load();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidDial {
                name: "NIS2_MAX_RECOMMENDATIONS"
            })
        ));
        reset_env();
    }
}
