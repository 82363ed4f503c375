use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::AnimelistError;

const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Overrides `api.base_url` when set.
pub const API_URL_ENV: &str = "ANIMELIST_API_URL";

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    pub browser: BrowserConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub page_size: u32,
    pub episode_limit: u32,
    /// Request timeout; `0` disables it.
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    pub viewport_rows: u32,
}

impl AppConfig {
    /// Load config: the user file replaces the built-in defaults when it exists.
    pub fn load() -> Result<Self, AnimelistError> {
        let user_path = Self::config_path();
        let config = if user_path.exists() {
            let user_str = std::fs::read_to_string(&user_path)?;
            Self::parse(&user_str)?
        } else {
            Self::parse(DEFAULT_CONFIG)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn parse(s: &str) -> Result<Self, AnimelistError> {
        toml::from_str(s).map_err(|e| AnimelistError::Config(e.to_string()))
    }

    /// Save current config to the user config file.
    pub fn save(&self) -> Result<PathBuf, AnimelistError> {
        let path = Self::config_path();
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), AnimelistError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| AnimelistError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        tracing::info!(path = %path.display(), "Config saved");
        Ok(())
    }

    /// Reject values the pager and the client cannot work with.
    pub fn validate(&self) -> Result<(), AnimelistError> {
        url::Url::parse(&self.api_base_url())
            .map_err(|e| AnimelistError::Config(format!("api.base_url: {e}")))?;
        if self.api.page_size == 0 {
            return Err(AnimelistError::Config("api.page_size must be at least 1".into()));
        }
        if self.browser.viewport_rows == 0 {
            return Err(AnimelistError::Config(
                "browser.viewport_rows must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// The API base URL, honoring the environment override.
    pub fn api_base_url(&self) -> String {
        std::env::var(API_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| self.api.base_url.clone())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.api.timeout_secs > 0).then(|| Duration::from_secs(self.api.timeout_secs))
    }

    /// Path to user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Directory holding the preference files and logs.
    pub fn data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.storage.data_dir {
            return dir.clone();
        }
        Self::project_dirs()
            .map(|d| d.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Ensure the data directory exists and return it.
    pub fn ensure_data_dir(&self) -> Result<PathBuf, AnimelistError> {
        let dir = self.data_dir();
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "animelist")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("built-in default config is valid TOML")
    }
}
