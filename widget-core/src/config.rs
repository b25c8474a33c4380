use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::city::{CityAlias, CityDirectory};
use crate::location::DEFAULT_GEOLOCATION_URL;
use crate::provider::openweather::{DEFAULT_BASE_URL, DEFAULT_LANG};

/// Environment variable that overrides the stored API key.
pub const API_KEY_ENV: &str = "WEATHER_API_KEY";

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// lang = "kr"
///
/// [[aliases]]
/// local = "포항"
/// canonical = "Pohang"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OpenWeatherMap API key.
    pub api_key: Option<String>,

    /// Current-weather endpoint.
    pub base_url: String,

    /// Language hint for condition descriptions.
    pub lang: String,

    /// IP geolocation endpoint used for device location.
    pub geolocation_url: String,

    pub timeout_secs: u64,

    /// Extra cities on top of the built-in list.
    pub aliases: Vec<CityAlias>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            lang: DEFAULT_LANG.to_string(),
            geolocation_url: DEFAULT_GEOLOCATION_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            aliases: Vec::new(),
        }
    }
}

impl Config {
    /// Load config from disk (or defaults on first run), then apply the
    /// `WEATHER_API_KEY` environment override.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::load_file()?;
        cfg.apply_env_api_key(std::env::var(API_KEY_ENV).ok());
        Ok(cfg)
    }

    /// Load only what is stored on disk.
    pub fn load_file() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-widget", "weather-widget")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// A non-empty environment value wins over the stored key.
    pub fn apply_env_api_key(&mut self, value: Option<String>) {
        if let Some(key) = value.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    pub fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().filter(|k| !k.is_empty()).ok_or_else(|| {
            anyhow!(
                "No API key configured.\n\
                 Hint: run `weather-widget configure` or set {API_KEY_ENV}."
            )
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Built-in cities plus configured aliases.
    pub fn directory(&self) -> Result<CityDirectory> {
        CityDirectory::with_aliases(self.aliases.iter().cloned())
            .context("Invalid city alias in config")
    }
}
