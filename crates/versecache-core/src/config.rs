//! Application configuration management.
//!
//! This module handles loading and saving the client configuration,
//! which includes the API base URL, the bearer token, and the user id.
//!
//! Configuration is stored at `~/.config/versecache/config.json`.
//! `VERSECACHE_API_URL` and `VERSECACHE_TOKEN` override the stored values.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "versecache";

/// Config file name
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub auth_token: Option<String>,
    pub user_id: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let config = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Self::default()
        };
        Ok(config.with_env_overrides(
            std::env::var("VERSECACHE_API_URL").ok(),
            std::env::var("VERSECACHE_TOKEN").ok(),
        ))
    }

    /// Apply environment overrides on top of the stored values.
    fn with_env_overrides(mut self, api_url: Option<String>, token: Option<String>) -> Self {
        if let Some(url) = api_url {
            self.api_base_url = Some(url);
        }
        if let Some(token) = token {
            self.auth_token = Some(token);
        }
        self
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;

        let mut path = cache_dir.join(APP_NAME);
        if let Some(ref user) = self.user_id {
            path = path.join(user);
        }
        Ok(path)
    }
}
