use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    backend::DEFAULT_ENDPOINT,
    geolocation::DEFAULT_GEOLOCATION_URL,
    map::{DEFAULT_ZOOM, OSM_TILE_URL},
    model::{FormInput, Location},
    state::AppState,
};

/// Initial form contents when a session starts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Defaults {
    pub lat: f64,
    pub lng: f64,
    pub date: NaiveDate,
    pub activity: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            lat: 9.82,
            lng: 77.18,
            date: NaiveDate::from_ymd_opt(2025, 10, 11).unwrap_or_default(),
            activity: "Indoor games".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MapConfig {
    pub tile_url: String,
    pub zoom: u8,
    /// Viewport size in pixels, used to turn clicks into coordinates.
    pub width: u32,
    pub height: u32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self { tile_url: OSM_TILE_URL.to_string(), zoom: DEFAULT_ZOOM, width: 800, height: 400 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeolocationConfig {
    pub enabled: bool,
    pub url: String,
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self { enabled: true, url: DEFAULT_GEOLOCATION_URL.to_string() }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// endpoint = "http://127.0.0.1:5000/api/analyze"
///
/// [defaults]
/// lat = 9.82
/// lng = 77.18
/// date = "2025-10-11"
/// activity = "Indoor games"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub endpoint: String,
    /// No timeout when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    pub defaults: Defaults,
    pub map: MapConfig,
    pub geolocation: GeolocationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout_secs: None,
            defaults: Defaults::default(),
            map: MapConfig::default(),
            geolocation: GeolocationConfig::default(),
        }
    }
}

impl Config {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn initial_location(&self) -> Result<Location> {
        Location::new(self.defaults.lat, self.defaults.lng)
            .context("Invalid default location in configuration")
    }

    /// State a fresh session starts from.
    pub fn initial_state(&self) -> Result<AppState> {
        let form = FormInput { date: self.defaults.date, activity: self.defaults.activity.clone() };
        Ok(AppState::new(self.initial_location()?, form))
    }

    /// Load config from disk, or return the defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        cfg.initial_location()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

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
        let dirs = ProjectDirs::from("dev", "skysense", "skysense")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
