use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::preload::FeedbackText;

const TITLE_PLACEHOLDER: &str = "{title}";

/// Preloader settings, read from `config.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreloaderConfig {
    /// Shown when an item has feedback text but no start message
    pub default_start_message: String,
    /// Used when an item has no success message; `{title}` is replaced
    pub success_template: String,
    /// Used when an item has no error message; `{title}` is replaced
    pub error_template: String,
    /// Abandon a preload that takes longer than this
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preload_timeout_ms: Option<u64>,
    pub log_file: String,
}

impl Default for PreloaderConfig {
    fn default() -> Self {
        Self {
            default_start_message: "Loading...".to_string(),
            success_template: "{title} loaded!".to_string(),
            error_template: "Failed to load {title}.".to_string(),
            preload_timeout_ms: None,
            log_file: "page-preloader.log".to_string(),
        }
    }
}

impl PreloaderConfig {
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "linux") {
            dirs::config_dir()
                .context("Failed to get XDG config directory")?
                .join("page-preloader")
        } else {
            dirs::home_dir()
                .context("Failed to get home directory")?
                .join(".page-preloader")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Load from `path`. A missing file gives the defaults, a malformed one is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading config from: {:?}", path);

        if !path.exists() {
            info!("Config file doesn't exist, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: PreloaderConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        debug!("Loaded config: {:?}", config);
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        debug!("Saving config to: {:?}", path);

        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create config directory: {:?}", dir))?;
                info!("Created config directory: {:?}", dir);
            }
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        info!("Config saved successfully");
        Ok(())
    }

    pub fn preload_timeout(&self) -> Option<Duration> {
        self.preload_timeout_ms.map(Duration::from_millis)
    }

    pub fn start_message(&self, text: Option<&FeedbackText>) -> String {
        text.and_then(|t| t.start_message.clone())
            .unwrap_or_else(|| self.default_start_message.clone())
    }

    pub fn success_message(&self, title: &str, text: Option<&FeedbackText>) -> String {
        text.and_then(|t| t.success_message.clone())
            .unwrap_or_else(|| self.success_template.replace(TITLE_PLACEHOLDER, title))
    }

    pub fn error_message(&self, title: &str, text: Option<&FeedbackText>) -> String {
        text.and_then(|t| t.error_message.clone())
            .unwrap_or_else(|| self.error_template.replace(TITLE_PLACEHOLDER, title))
    }
}
