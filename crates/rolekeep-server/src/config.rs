//! Configuration management for the rolekeep server.
//!
//! Sources, lowest precedence first:
//! 1. Built-in defaults
//! 2. Configuration file (YAML)
//! 3. Environment variables prefixed with `ROLEKEEP_`, `__` separating
//!    nested keys (`ROLEKEEP_SERVER__PORT=9090` overrides `server.port`)

use std::path::Path;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use rolekeep_db::DbConfig;
use serde::{Deserialize, Serialize};

/// Server configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub database: DbConfig,

    #[serde(default)]
    pub logging: LoggingSettings,

    #[serde(default)]
    pub permissions: PermissionSettings,
}

/// Server network settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Maximum request body size in bytes.
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_body_limit() -> usize {
    1024 * 1024
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LoggingSettings {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Use JSON format (true for production, false for development)
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Permission write policy.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct PermissionSettings {
    /// Roles accepted by bulk upsert. Empty accepts any non-empty role.
    #[serde(default)]
    pub allowed_roles: Vec<String>,
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] ConfigError),

    #[error("configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("failed to read configuration file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl ServerConfig {
    /// Load configuration from a YAML file with environment variable overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigLoadError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigLoadError::Read {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_yaml_str(&contents)
    }

    /// Load configuration from YAML text with environment variable overrides.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigLoadError> {
        let builder = Self::defaults()?.add_source(File::from_str(yaml, FileFormat::Yaml));
        Self::finish(builder)
    }

    /// Load configuration from environment variables only.
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        Self::finish(Self::defaults()?)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigLoadError> {
        Ok(Config::builder().add_source(Config::try_from(&ServerConfig::default())?))
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigLoadError> {
        let config = builder
            .add_source(
                Environment::with_prefix("ROLEKEEP")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("permissions.allowed_roles")
                    .try_parsing(true),
            )
            .build()?;

        let server_config: ServerConfig = config.try_deserialize()?;
        server_config.validate()?;

        Ok(server_config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.server.port == 0 {
            return Err(ConfigLoadError::Invalid {
                message: "server.port must be greater than 0".to_string(),
            });
        }

        if self.server.body_limit_bytes == 0 {
            return Err(ConfigLoadError::Invalid {
                message: "server.body_limit_bytes must be greater than 0".to_string(),
            });
        }

        for (field, value) in [
            ("database.url", &self.database.url),
            ("database.namespace", &self.database.namespace),
            ("database.database", &self.database.database),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigLoadError::Invalid {
                    message: format!("{field} must not be empty"),
                });
            }
        }

        if !VALID_LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigLoadError::Invalid {
                message: format!(
                    "logging.level must be one of: {:?}, got: {}",
                    VALID_LOG_LEVELS, self.logging.level
                ),
            });
        }

        if self
            .permissions
            .allowed_roles
            .iter()
            .any(|role| role.trim().is_empty())
        {
            return Err(ConfigLoadError::Invalid {
                message: "permissions.allowed_roles must not contain empty roles".to_string(),
            });
        }

        Ok(())
    }
}
