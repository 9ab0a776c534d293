use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Environment variables consulted for the extractor key, in order
pub const API_KEY_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Gemini model used for action item extraction
    pub gemini_model: String,
    /// Gemini API base URL
    pub gemini_endpoint: String,
    /// Extraction request timeout in seconds (minimum 1, default 30)
    pub request_timeout_secs: u64,
    /// Days from today used when notes give no due date
    pub default_due_days: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_model: "gemini-3-flash-preview".to_string(),
            gemini_endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            request_timeout_secs: 30,
            default_due_days: 7,
        }
    }
}

impl Config {
    /// Load configuration, falling back to defaults on any failure
    pub fn load() -> Self {
        match Self::config_path() {
            Ok(config_path) => Self::load_from(&config_path),
            Err(e) => {
                warn!("no config location, using defaults: {e}");
                Config::default()
            }
        }
    }

    /// Load configuration from `config_path`, writing defaults if it is missing
    pub fn load_from(config_path: &Path) -> Self {
        if !config_path.exists() {
            let default_config = Config::default();
            if let Err(e) = default_config.save_to(config_path) {
                warn!(path = %config_path.display(), "could not write default config: {e}");
            }
            return default_config;
        }

        let content = match fs::read_to_string(config_path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %config_path.display(), "could not read config, using defaults: {e}");
                return Config::default();
            }
        };

        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!(path = %config_path.display(), "invalid config, using defaults: {e}");
            Config::default()
        })
    }

    /// Save configuration to `config_path`
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, content)?;
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        // Use XDG config directory standard or fallback to ~/.config
        let config_dir = match std::env::var("XDG_CONFIG_HOME") {
            Ok(xdg_config) if !xdg_config.is_empty() => PathBuf::from(xdg_config),
            _ => dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?
                .join(".config"),
        };

        Ok(config_dir.join("action-tracker").join("config.json"))
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Extractor API key from the environment, if any
    pub fn api_key(&self) -> Option<String> {
        API_KEY_VARS
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|value| !value.trim().is_empty())
    }
}
