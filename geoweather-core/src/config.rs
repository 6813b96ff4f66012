use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::coordinate::Coordinate;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_NOMINATIM_BASE_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_USER_AGENT: &str = concat!("GeoWeatherRealtime/", env!("CARGO_PKG_VERSION"));

/// Environment variables checked, in order, when the file holds no API key.
pub const API_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

/// Gemini settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

/// Nominatim settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeocoderConfig {
    pub base_url: Option<String>,
    /// Nominatim asks clients to identify themselves.
    pub user_agent: Option<String>,
}

/// Stand-in for device location on machines without one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HomeConfig {
    pub latitude: f64,
    pub longitude: f64,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [gemini]
/// api_key = "..."
/// model = "gemini-2.5-flash"
///
/// [home]
/// latitude = 1.3521
/// longitude = 103.8198
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gemini: GeminiConfig,

    #[serde(default)]
    pub geocoder: GeocoderConfig,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home: Option<HomeConfig>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "geoweather", "geoweather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// API key from the file, else from the environment.
    pub fn api_key(&self) -> Option<String> {
        self.api_key_with(|name| std::env::var(name).ok())
    }

    pub(crate) fn api_key_with(&self, env: impl Fn(&str) -> Option<String>) -> Option<String> {
        self.gemini
            .api_key
            .clone()
            .or_else(|| API_KEY_ENV_VARS.iter().find_map(|name| env(name)))
            .filter(|key| !key.trim().is_empty())
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.gemini.api_key = Some(api_key);
    }

    pub fn model(&self) -> &str {
        self.gemini.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn gemini_base_url(&self) -> &str {
        self.gemini.base_url.as_deref().unwrap_or(DEFAULT_GEMINI_BASE_URL)
    }

    pub fn geocoder_base_url(&self) -> &str {
        self.geocoder.base_url.as_deref().unwrap_or(DEFAULT_NOMINATIM_BASE_URL)
    }

    pub fn user_agent(&self) -> &str {
        self.geocoder.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }

    /// Configured home location, validated.
    pub fn home_coordinate(&self) -> Result<Option<Coordinate>> {
        self.home
            .map(|h| {
                Coordinate::new(h.latitude, h.longitude)
                    .with_context(|| "Invalid [home] location in config")
            })
            .transpose()
    }

    pub fn set_home(&mut self, home: Option<Coordinate>) {
        self.home = home.map(|c| HomeConfig {
            latitude: c.latitude(),
            longitude: c.longitude(),
        });
    }
}
