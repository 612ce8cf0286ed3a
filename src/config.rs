//! Application configuration management.
//!
//! Configuration is stored at `~/.config/gatherkit/config.json` and holds the
//! API root plus a convenience copy of the last email used to log in. The
//! token store lives separately under the platform data directory so that
//! deleting the config does not log the user out.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/data directory paths
const APP_NAME: &str = "gatherkit";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// API root used when neither the config file nor the environment names one
const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Environment variable overriding the API root
const BASE_URL_ENV: &str = "GATHERKIT_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub base_url: String,
    pub last_email: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            last_email: None,
        }
    }
}

impl Config {
    /// Load the config file if present, falling back to defaults. The
    /// `GATHERKIT_API_URL` environment variable overrides the stored API root.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config: Config = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Self::default()
        };

        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            config.base_url = url;
        }
        Ok(config)
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

    /// Directory holding durable client state (the token store).
    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }
}
