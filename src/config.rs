//! Configuration management for the fraud predictor

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Always applied on top of the configured level
const CRATE_LOG_DIRECTIVE: &str = "fraud_predictor=info";

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Log output format
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
        }
    }
}

impl ServerConfig {
    /// `host:port` string suitable for binding a listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Model artifact configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to the ONNX model file
    pub path: String,
    /// Input tensor name; the first declared input is used when absent from the model
    pub input_name: String,
    /// Output carrying the predicted label (-1 anomaly, 1 normal)
    pub label_output: String,
    /// Output carrying the decision-function score
    pub score_output: String,
    /// Number of intra-op threads for ONNX inference
    pub onnx_threads: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: "models/fraud_predictor.onnx".to_string(),
            input_name: "float_input".to_string(),
            label_output: "label".to_string(),
            score_output: "scores".to_string(),
            onnx_threads: 1,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl LoggingConfig {
    /// Filter from `RUST_LOG` when set, else the configured level, plus the
    /// crate's own `info` directive
    pub fn env_filter(&self) -> Result<EnvFilter> {
        let from_env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
        self.env_filter_with(from_env.as_deref())
    }

    fn env_filter_with(&self, from_env: Option<&str>) -> Result<EnvFilter> {
        let directives = from_env.unwrap_or(self.level.as_str());
        let filter = EnvFilter::try_new(directives)
            .with_context(|| format!("Invalid log filter {:?}", directives))?;

        Ok(filter.add_directive(CRATE_LOG_DIRECTIVE.parse()?))
    }
}

impl AppConfig {
    /// Load configuration from the default file, falling back to built-in defaults
    /// for the file itself and for any missing key.
    pub fn load() -> Result<Self> {
        Self::build(DEFAULT_CONFIG_PATH, false)
    }

    /// Load configuration from a specific path; the file must exist
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::build(path, true)
    }

    fn build<P: AsRef<Path>>(path: P, required: bool) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()).required(required))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.bind_addr(), "127.0.0.1:8501");
        assert_eq!(config.model.path, "models/fraud_predictor.onnx");
        assert_eq!(config.model.label_output, "label");
        assert_eq!(config.model.score_output, "scores");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[server]\nport = 9000\n\n[logging]\nformat = \"json\"").unwrap();

        let config = AppConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.model.onnx_threads, 1);
    }

    #[test]
    fn test_env_filter_keeps_crate_info_logs() {
        let logging = LoggingConfig {
            level: "warn".to_string(),
            format: LogFormat::Pretty,
        };

        let filter = logging.env_filter_with(None).unwrap().to_string();
        assert!(filter.contains("warn"), "{}", filter);
        assert!(filter.contains("fraud_predictor=info"), "{}", filter);

        let filter = logging.env_filter_with(Some("error")).unwrap().to_string();
        assert!(filter.contains("error"), "{}", filter);
        assert!(filter.contains("fraud_predictor=info"), "{}", filter);
    }

    #[test]
    fn test_invalid_log_filter_is_an_error() {
        let logging = LoggingConfig {
            level: "loud=noisy".to_string(),
            format: LogFormat::Pretty,
        };
        assert!(logging.env_filter_with(None).is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        assert!(AppConfig::load_from_path("does/not/exist.toml").is_err());
    }
}
