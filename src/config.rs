use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::session::FileCredentialStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the TaskShare backend
    pub api_url: String,

    /// Where the bearer token is persisted between runs
    pub credential_path: Option<PathBuf>,

    /// Per-request timeout (seconds)
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".to_string(),
            credential_path: None,
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration from file, creating a default one on first run.
    /// `TASKSHARE_API_URL` and `TASKSHARE_TOKEN_PATH` override the file.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("failed to read {}", config_path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("invalid config at {}", config_path.display()))?
        } else {
            let default_config = Self::default();
            default_config.save()?;
            default_config
        };

        if let Ok(url) = std::env::var("TASKSHARE_API_URL") {
            config.api_url = url;
        }
        if let Ok(path) = std::env::var("TASKSHARE_TOKEN_PATH") {
            config.credential_path = Some(PathBuf::from(path));
        }
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)
            .with_context(|| format!("failed to write {}", config_path.display()))
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("could not determine config directory")?;
        Ok(config_dir.join("taskshare").join("config.toml"))
    }

    pub fn credential_path(&self) -> Result<PathBuf> {
        match &self.credential_path {
            Some(path) => Ok(path.clone()),
            None => FileCredentialStore::default_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_url, "http://localhost:8000");
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.credential_path.is_none());
    }

    #[test]
    fn test_round_trips_through_toml() {
        let config = Config {
            api_url: "https://taskshare.example.com/api".to_string(),
            credential_path: Some(PathBuf::from("/tmp/token")),
            request_timeout_secs: 10,
        };
        let content = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&content).unwrap();
        assert_eq!(parsed.api_url, config.api_url);
        assert_eq!(parsed.credential_path, config.credential_path);
        assert_eq!(parsed.request_timeout_secs, 10);
    }
}
