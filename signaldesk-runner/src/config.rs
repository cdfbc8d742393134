//! Application configuration, loaded from TOML.
//!
//! Every section and key is optional; missing values take the defaults below.
//! Resolution order for the file path: explicit path, then `SIGNALDESK_CONFIG`,
//! then `signaldesk.toml` in the working directory if it exists.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use signaldesk_core::indicators::SmaWindows;
use thiserror::Error;

/// Env var naming the config file.
pub const CONFIG_ENV_VAR: &str = "SIGNALDESK_CONFIG";

/// Config file looked up in the working directory when nothing else is given.
pub const DEFAULT_CONFIG_FILE: &str = "signaldesk.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub data: DataConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub initial_equity: f64,
    pub default_short_window: i64,
    pub default_long_window: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_equity: 100_000.0,
            default_short_window: 5,
            default_long_window: 20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceKind {
    #[default]
    Csv,
    Http,
    Synthetic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub source: DataSourceKind,
    pub bars_dir: PathBuf,
    pub base_url: String,
    pub timeout_secs: u64,
    pub pnl_ledger: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            source: DataSourceKind::Csv,
            bars_dir: PathBuf::from("data/bars"),
            base_url: "http://127.0.0.1:9000".to_string(),
            timeout_secs: 10,
            pnl_ledger: PathBuf::from("data/pnl_daily.csv"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
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

impl AppConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Load from `explicit`, else `SIGNALDESK_CONFIG`, else `signaldesk.toml` if
    /// present, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            return Self::from_file(Path::new(&path));
        }
        let fallback = Path::new(DEFAULT_CONFIG_FILE);
        if fallback.is_file() {
            return Self::from_file(fallback);
        }
        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let engine = &self.engine;
        if !(engine.initial_equity.is_finite() && engine.initial_equity > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "engine.initial_equity must be positive, got {}",
                engine.initial_equity
            )));
        }
        SmaWindows::new(engine.default_short_window, engine.default_long_window)
            .map_err(|e| ConfigError::Invalid(format!("engine default windows: {e}")))?;

        match self.data.source {
            DataSourceKind::Csv if self.data.bars_dir.as_os_str().is_empty() => {
                return Err(ConfigError::Invalid(
                    "data.bars_dir must be set for the csv source".into(),
                ));
            }
            DataSourceKind::Http if self.data.base_url.trim().is_empty() => {
                return Err(ConfigError::Invalid(
                    "data.base_url must be set for the http source".into(),
                ));
            }
            _ => {}
        }
        if self.data.timeout_secs == 0 {
            return Err(ConfigError::Invalid("data.timeout_secs must be > 0".into()));
        }
        if self.server.bind.trim().is_empty() {
            return Err(ConfigError::Invalid("server.bind must be set".into()));
        }
        if self.server.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "server.request_timeout_secs must be > 0".into(),
            ));
        }
        Ok(())
    }
}
