//! Application configuration storage
//!
//! Settings come from `<data_dir>/config.json` when present, then from
//! environment variables. API keys are only ever read from the
//! environment; they are never written back to disk.

use std::path::{Path, PathBuf};

use design2web_service::constants::quota::DAILY_LIMIT;
use inference::constants::backends;
use inference::BackendConfig;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::constants::{env, hosts, paths, ports};

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: hosts::LOCAL.to_string(),
            port: ports::SERVER,
        }
    }
}

fn default_backend() -> String {
    backends::GEMINI.to_string()
}

fn default_daily_limit() -> u32 {
    DAILY_LIMIT
}

/// Full application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    /// Registry name of the completion backend
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Connection settings handed to the backend
    #[serde(default)]
    pub inference: BackendConfig,
    /// Design generations allowed per user per day
    #[serde(default = "default_daily_limit")]
    pub daily_limit: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            backend: default_backend(),
            inference: BackendConfig::default(),
            daily_limit: default_daily_limit(),
        }
    }
}

impl AppConfig {
    /// Load configuration from disk
    pub async fn load(data_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = data_dir.join(paths::CONFIG_FILE);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&config_path)
            .await
            .map_err(ConfigError::Io)?;

        serde_json::from_str(&contents).map_err(ConfigError::Parse)
    }

    /// Save configuration to disk
    pub async fn save(&self, data_dir: &Path) -> Result<(), ConfigError> {
        fs::create_dir_all(data_dir).await.map_err(ConfigError::Io)?;

        let config_path = data_dir.join(paths::CONFIG_FILE);
        let contents = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;

        fs::write(&config_path, contents)
            .await
            .map_err(ConfigError::Io)?;

        log::info!("Configuration saved to {:?}", config_path);
        Ok(())
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = lookup(env::BIND) {
            self.server.host = host;
        }
        if let Some(port) = lookup(env::PORT) {
            self.server.port = parse_value(env::PORT, &port)?;
        }
        if let Some(backend) = lookup(env::BACKEND) {
            self.backend = backend.trim().to_lowercase();
        }
        if let Some(model) = lookup(env::MODEL) {
            self.inference.model = Some(model);
        }
        if let Some(base_url) = lookup(env::BASE_URL) {
            self.inference.base_url = Some(base_url);
        }
        if let Some(limit) = lookup(env::DAILY_LIMIT) {
            self.daily_limit = parse_value(env::DAILY_LIMIT, &limit)?;
        }

        let key_var = if self.backend == backends::OPENAI {
            env::OPENAI_API_KEY
        } else {
            env::GEMINI_API_KEY
        };
        if let Some(key) = lookup(key_var) {
            self.inference.api_key = Some(key);
        }
        Ok(())
    }

    /// `host:port` for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Data directory from the environment, or the default
pub fn data_dir() -> PathBuf {
    std::env::var(env::DATA_DIR)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(paths::DATA_DIR))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(serde_json::Error),
    #[error("Failed to serialize config: {0}")]
    Serialize(serde_json::Error),
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[tokio::test]
    async fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(dir.path()).await.unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
        assert_eq!(config.daily_limit, 3);
    }

    #[tokio::test]
    async fn test_save_load_round_trip_drops_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.backend = "openai".into();
        config.inference.model = Some("gpt-4o".into());
        config.inference.api_key = Some("secret".into());
        config.save(dir.path()).await.unwrap();

        let raw = std::fs::read_to_string(dir.path().join("config.json")).unwrap();
        assert!(!raw.contains("secret"));

        let loaded = AppConfig::load(dir.path()).await.unwrap();
        assert_eq!(loaded.backend, "openai");
        assert_eq!(loaded.inference.model.as_deref(), Some("gpt-4o"));
        assert_eq!(loaded.inference.api_key, None);
    }

    #[tokio::test]
    async fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), "{not json").unwrap();
        assert!(matches!(
            AppConfig::load(dir.path()).await,
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_overrides(lookup(&[
                ("DESIGN2WEB_PORT", "8088"),
                ("DESIGN2WEB_BACKEND", "OpenAI"),
                ("DESIGN2WEB_DAILY_LIMIT", "10"),
                ("GEMINI_API_KEY", "gem"),
                ("OPENAI_API_KEY", "oai"),
                ("DESIGN2WEB_MODEL", ""),
            ]))
            .unwrap();
        assert_eq!(config.server.port, 8088);
        assert_eq!(config.backend, "openai");
        assert_eq!(config.daily_limit, 10);
        assert_eq!(config.inference.api_key.as_deref(), Some("oai"));
        assert_eq!(config.inference.model, None);
    }

    #[test]
    fn test_invalid_port_rejected() {
        let mut config = AppConfig::default();
        let err = config
            .apply_overrides(lookup(&[("DESIGN2WEB_PORT", "eighty")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
