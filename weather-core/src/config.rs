use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{Coordinates, client::Units, client::openweather::DEFAULT_BASE_URL};

/// API key baked in at compile time by `build.rs`, from the `WEATHER_API_KEY`
/// environment variable or `weatherApiKey` in `local.properties`; empty when unset.
///
/// A missing key is not a build error; the service rejects requests at runtime.
pub const BUILD_API_KEY: &str = match option_env!("WEATHER_API_KEY") {
    Some(key) => key,
    None => "",
};

/// How the app finds out where the user is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationMode {
    /// Approximate location from the public IP address; needs consent.
    #[default]
    GeoIp,
    /// Coordinates written in the config file.
    Fixed,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default)]
    pub mode: LocationMode,

    /// Whether the user agreed to IP-based lookups.
    #[serde(default)]
    pub consent: bool,

    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl LocationConfig {
    pub fn fixed_coordinates(&self) -> Option<Coordinates> {
        self.latitude
            .zip(self.longitude)
            .map(|(lat, lon)| Coordinates::new(lat, lon))
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// units = "metric"
///
/// [location]
/// mode = "geoip"
/// consent = true
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub api_key: Option<String>,

    #[serde(default)]
    pub units: Units,

    /// Overrides the weather service base URL.
    pub base_url: Option<String>,

    #[serde(default)]
    pub location: LocationConfig,
}

impl Config {
    /// Load config from the platform config directory, or defaults on first run.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
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
        let dirs = ProjectDirs::from("dev", "weather-today", "weather-today")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Configured key, else the build-time key, else empty.
    pub fn api_key(&self) -> &str {
        self.api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .unwrap_or(BUILD_API_KEY)
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = if api_key.trim().is_empty() {
            None
        } else {
            Some(api_key.trim().to_string())
        };
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn use_fixed_location(&mut self, coordinates: Coordinates) {
        self.location.mode = LocationMode::Fixed;
        self.location.latitude = Some(coordinates.latitude);
        self.location.longitude = Some(coordinates.longitude);
    }

    pub fn use_geoip_location(&mut self, consent: bool) {
        self.location.mode = LocationMode::GeoIp;
        self.location.consent = consent;
    }
}
