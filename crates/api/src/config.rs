use chrono::{FixedOffset, Offset, Utc};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    pub backend: BackendConfig,
    #[serde(default)]
    pub reports: ReportsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Adds Strict-Transport-Security; enable only behind TLS termination.
    #[serde(default)]
    pub hsts_enabled: bool,
}

/// Fleet monitoring backend the reports are built from.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Base URL including any API prefix, e.g. `https://fleet.example.com/api`.
    #[serde(default)]
    pub base_url: String,

    /// Bearer token sent with every backend request.
    #[serde(default)]
    pub api_token: Option<String>,

    #[serde(default = "default_backend_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportsConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Zone for printed timestamps and file names, in minutes east of UTC.
    #[serde(default)]
    pub utc_offset_minutes: i32,

    /// Render a GLOBAL report into `output_dir` once a day.
    #[serde(default)]
    pub daily_enabled: bool,

    /// Saved reports older than this are deleted; 0 keeps them forever.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,

    /// Upper bound for `POST /api/v1/reports` bodies.
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: usize,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            utc_offset_minutes: 0,
            daily_enabled: false,
            retention_days: default_retention_days(),
            max_payload_bytes: default_max_payload_bytes(),
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_backend_timeout_ms() -> u64 {
    10_000
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("reports")
}
fn default_retention_days() -> u32 {
    30
}
fn default_max_payload_bytes() -> usize {
    5 * 1_048_576
}

const MAX_OFFSET_MINUTES: i32 = 14 * 60;

#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with LG__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("LG")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("security.cors_origins")
                    .try_parsing(true),
            )
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// Defaults are embedded so tests never depend on files on disk.
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "0.0.0.0"
            port = 8080
            request_timeout_secs = 30

            [logging]
            level = "info"
            format = "json"

            [security]
            cors_origins = []
            hsts_enabled = false

            [backend]
            base_url = ""
            timeout_ms = 10000

            [reports]
            output_dir = "reports"
            utc_offset_minutes = 0
            daily_enabled = false
            retention_days = 30
            max_payload_bytes = 5242880
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        // Validation is left to the caller so partial configs can be inspected
        builder.build()?.try_deserialize()
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let base_url = self.backend.base_url.trim();
        if base_url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "LG__BACKEND__BASE_URL environment variable must be set".to_string(),
            ));
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigValidationError::InvalidValue(format!(
                "backend.base_url must use http or https: {}",
                base_url
            )));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.reports.utc_offset_minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(ConfigValidationError::InvalidValue(format!(
                "reports.utc_offset_minutes must be within ±{}",
                MAX_OFFSET_MINUTES
            )));
        }

        if self.reports.max_payload_bytes == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "reports.max_payload_bytes cannot be 0".to_string(),
            ));
        }

        self.socket_addr()?;
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigValidationError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|_| {
                ConfigValidationError::InvalidValue(format!(
                    "invalid listen address {}:{}",
                    self.server.host, self.server.port
                ))
            })
    }

    /// The report zone; validation guarantees the offset is in range.
    pub fn report_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.reports.utc_offset_minutes * 60).unwrap_or(Utc.fix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BACKEND: (&str, &str) = ("backend.base_url", "http://localhost:5000/api");

    #[test]
    fn test_config_load_with_defaults() {
        let config = Config::load_for_test(&[BACKEND]).expect("Failed to load config");

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.backend.timeout_ms, 10_000);
        assert!(config.backend.api_token.is_none());
        assert_eq!(config.reports.output_dir, PathBuf::from("reports"));
        assert_eq!(config.reports.retention_days, 30);
        assert!(!config.reports.daily_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_env_override() {
        let config = Config::load_for_test(&[
            BACKEND,
            ("server.port", "9000"),
            ("logging.level", "debug"),
            ("reports.utc_offset_minutes", "330"),
            ("backend.api_token", "secret"),
        ])
        .expect("Failed to load config");

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.reports.utc_offset_minutes, 330);
        assert_eq!(config.backend.api_token.as_deref(), Some("secret"));
        assert_eq!(config.report_offset().local_minus_utc(), 330 * 60);
    }

    #[test]
    fn test_config_validation_missing_backend_url() {
        let config = Config::load_for_test(&[]).expect("Failed to load config");
        let result = config.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("LG__BACKEND__BASE_URL"));
    }

    #[test]
    fn test_config_validation_backend_scheme() {
        let config = Config::load_for_test(&[("backend.base_url", "ftp://fleet.local")])
            .expect("Failed to load config");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("http or https"));
    }

    #[test]
    fn test_config_validation_offset_range() {
        let config = Config::load_for_test(&[BACKEND, ("reports.utc_offset_minutes", "900")])
            .expect("Failed to load config");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("utc_offset_minutes"));

        let config = Config::load_for_test(&[BACKEND, ("reports.utc_offset_minutes", "-720")])
            .expect("Failed to load config");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_zero_payload_limit() {
        let config = Config::load_for_test(&[BACKEND, ("reports.max_payload_bytes", "0")])
            .expect("Failed to load config");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_payload_bytes"));
    }

    #[test]
    fn test_config_validation_zero_port() {
        let config = Config::load_for_test(&[BACKEND, ("server.port", "0")])
            .expect("Failed to load config");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_socket_addr() {
        let config = Config::load_for_test(&[
            BACKEND,
            ("server.host", "127.0.0.1"),
            ("server.port", "3000"),
        ])
        .expect("Failed to load config");

        let addr = config.socket_addr().unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn test_socket_addr_rejects_hostname() {
        let config = Config::load_for_test(&[BACKEND, ("server.host", "not a host")])
            .expect("Failed to load config");
        assert!(config.socket_addr().is_err());
    }
}
