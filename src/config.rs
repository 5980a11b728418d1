//! Configuration management for the `ClimIA` service
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::error::ClimiaError;
use anyhow::{Context, Result};
use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the `ClimIA` service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClimiaConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Measurement store configuration
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Forecast engine settings
    #[serde(default)]
    pub forecast: ForecastConfig,
}

/// HTTP server configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_server_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// Bearer token required on `/api` routes (open access when unset)
    pub api_token: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u32,
}

/// Measurement store configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Store directory location
    #[serde(default = "default_storage_path")]
    pub path: String,
    /// JSON file of measurements imported at startup
    pub seed_file: Option<String>,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Forecast engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// IANA timezone deciding which date is "today"
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

// Default value functions
fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_request_timeout() -> u32 {
    30
}

fn default_storage_path() -> String {
    "data/climia".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_timezone() -> String {
    "America/Sao_Paulo".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            api_token: None,
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            seed_file: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
        }
    }
}

impl ClimiaConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path()
                .filter(|path| path.exists())
                .unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. CLIMIA_SERVER__PORT=9000
        builder = builder.add_source(
            Environment::with_prefix("CLIMIA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: ClimiaConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("climia").join("config.toml"))
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_server_host();
        }
        if self.server.request_timeout_seconds == 0 {
            self.server.request_timeout_seconds = default_request_timeout();
        }
        if self.storage.path.is_empty() {
            self.storage.path = default_storage_path();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.forecast.timezone.is_empty() {
            self.forecast.timezone = default_timezone();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_server()?;
        self.validate_string_values()?;
        self.timezone()?;
        Ok(())
    }

    /// Timezone used to decide the current date
    pub fn timezone(&self) -> Result<Tz> {
        self.forecast.timezone.parse::<Tz>().map_err(|_| {
            ClimiaError::config(format!(
                "Invalid timezone '{}'. Use an IANA name such as America/Sao_Paulo",
                self.forecast.timezone
            ))
            .into()
        })
    }

    fn validate_server(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(ClimiaError::config("Server port must be greater than 0").into());
        }

        if self.server.request_timeout_seconds > 300 {
            return Err(
                ClimiaError::config("Request timeout cannot exceed 300 seconds").into(),
            );
        }

        if let Some(token) = &self.server.api_token {
            if token.trim().is_empty() {
                return Err(ClimiaError::config(
                    "API token cannot be empty if provided. Either remove it or set a token.",
                )
                .into());
            }
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(ClimiaError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(ClimiaError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ClimiaConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.request_timeout_seconds, 30);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.forecast.timezone, "America/Sao_Paulo");
        assert!(config.server.api_token.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = ClimiaConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_timeout() {
        let mut config = ClimiaConfig::default();
        config.server.request_timeout_seconds = 500;
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));
    }

    #[test]
    fn test_config_validation_blank_token() {
        let mut config = ClimiaConfig::default();
        config.server.api_token = Some("  ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_timezone() {
        let mut config = ClimiaConfig::default();
        assert_eq!(config.timezone().unwrap(), chrono_tz::America::Sao_Paulo);

        config.forecast.timezone = "Mars/Olympus_Mons".to_string();
        assert!(config.validate().unwrap_err().to_string().contains("Invalid timezone"));
    }

    #[test]
    fn test_apply_defaults() {
        let mut config = ClimiaConfig::default();
        config.logging.format = String::new();
        config.storage.path = String::new();
        config.apply_defaults();
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.storage.path, "data/climia");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[server]\nport = 9090\napi_token = \"secret-token\"\n\n[forecast]\ntimezone = \"UTC\""
        )
        .unwrap();

        let config = ClimiaConfig::load_from_path(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.api_token.as_deref(), Some("secret-token"));
        assert_eq!(config.timezone().unwrap(), chrono_tz::UTC);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = ClimiaConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("climia"));
            assert!(path.to_string_lossy().contains("config.toml"));
        }
    }
}
