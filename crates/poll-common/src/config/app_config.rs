//! Application configuration structs
//!
//! Loads server configuration from environment variables (and `.env`).

use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub server: ServerConfig,
    pub hub: HubConfig,
    pub cors: CorsConfig,
    /// Durable storage; polls are kept in memory when absent
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// HTTP + push channel server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Broadcast hub configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HubConfig {
    /// Outbound frames queued per connection before it is considered too slow
    #[serde(default = "default_connection_buffer")]
    pub connection_buffer: usize,
    /// Keep-alive ping interval on the push channel, 0 disables pings
    #[serde(default = "default_ping_interval_secs")]
    pub ping_interval_secs: u64,
    /// Longest a single socket write may take before the connection is dropped
    #[serde(default = "default_write_timeout_secs")]
    pub write_timeout_secs: u64,
}

impl HubConfig {
    #[must_use]
    pub fn ping_interval(&self) -> Option<Duration> {
        (self.ping_interval_secs > 0).then(|| Duration::from_secs(self.ping_interval_secs))
    }

    #[must_use]
    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            connection_buffer: default_connection_buffer(),
            ping_interval_secs: default_ping_interval_secs(),
            write_timeout_secs: default_write_timeout_secs(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// CORS configuration
///
/// An empty origin list allows any origin.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

// Default value functions
fn default_app_name() -> String {
    "quickpoll".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_connection_buffer() -> usize {
    64
}

fn default_ping_interval_secs() -> u64 {
    30
}

fn default_write_timeout_secs() -> u64 {
    10
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Read an optional variable, failing only when it is set but unparsable
fn parse_var<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(name, raw)),
        Err(_) => Ok(None),
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Every variable has a default; only malformed values are errors.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let env = match env::var("APP_ENV") {
            Ok(raw) => Environment::parse(&raw).ok_or(ConfigError::InvalidValue("APP_ENV", raw))?,
            Err(_) => default_env(),
        };

        let connection_buffer =
            parse_var("HUB_CONNECTION_BUFFER")?.unwrap_or_else(default_connection_buffer);
        if connection_buffer == 0 {
            return Err(ConfigError::InvalidValue(
                "HUB_CONNECTION_BUFFER",
                "0".to_string(),
            ));
        }

        let write_timeout_secs =
            parse_var("HUB_WRITE_TIMEOUT_SECS")?.unwrap_or_else(default_write_timeout_secs);
        if write_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "HUB_WRITE_TIMEOUT_SECS",
                "0".to_string(),
            ));
        }

        let database = match env::var("DATABASE_URL") {
            Ok(url) if !url.trim().is_empty() => Some(DatabaseConfig {
                url: url.trim().to_string(),
                max_connections: parse_var("DATABASE_MAX_CONNECTIONS")?
                    .unwrap_or_else(default_max_connections),
                min_connections: parse_var("DATABASE_MIN_CONNECTIONS")?
                    .unwrap_or_else(default_min_connections),
            }),
            _ => None,
        };

        Ok(Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
                env,
            },
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| default_host()),
                port: parse_var("SERVER_PORT")?.unwrap_or_else(default_port),
                request_timeout_secs: parse_var("REQUEST_TIMEOUT_SECS")?
                    .unwrap_or_else(default_request_timeout_secs),
            },
            hub: HubConfig {
                connection_buffer,
                ping_interval_secs: parse_var("HUB_PING_INTERVAL_SECS")?
                    .unwrap_or_else(default_ping_interval_secs),
                write_timeout_secs,
            },
            cors: CorsConfig {
                allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                    .ok()
                    .map(|s| {
                        s.split(',')
                            .map(str::trim)
                            .filter(|o| !o.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            database,
        })
    }

    /// Configuration with every default applied, bound to the given port
    ///
    /// Used by tests that spin up an in-process server.
    #[must_use]
    pub fn local(port: u16) -> Self {
        Self {
            app: AppSettings {
                name: default_app_name(),
                env: Environment::Development,
            },
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port,
                request_timeout_secs: default_request_timeout_secs(),
            },
            hub: HubConfig::default(),
            cors: CorsConfig::default(),
            database: None,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
