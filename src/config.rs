//! Runtime configuration for status-panel.
//!
//! Everything the server needs to know about its upstream sources lives in a
//! single `Config` struct read from TOML. Every section is
//! `#[serde(default)]`, so a partial file only overrides what it names.
//!
//! Default location: `$XDG_CONFIG_HOME/status-panel/config.toml`, falling
//! back to `~/.config/status-panel/config.toml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono_tz::Tz;

use crate::circadian::TwilightLandmarks;

const APP_NAME: &str = "status-panel";

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Root configuration container.
#[derive(Debug, Clone, Default, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub display: DisplayConfig,
    pub location: LocationConfig,
    pub calendar: CalendarConfig,
    pub weather: WeatherConfig,
    pub twilight: TwilightConfig,
    pub transit: TransitConfig,
    pub bikes: BikesConfig,
    pub art: Vec<ArtSlotConfig>,
    pub fetch: FetchConfig,
    pub fonts: FontsConfig,
}

// --- Sub-structs ---

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// IANA zone used for every wall-clock value on the panel.
    pub timezone: String,
}

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct LocationConfig {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Default, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub urls: Vec<String>,
}

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub forecast_url: String,
    /// `<base>/<icon>.svg` is fetched for the current condition when set.
    pub icon_base_url: Option<String>,
}

/// Fixed `HH:MM` landmarks. When all four are set the twilight source is not
/// queried.
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct TwilightConfig {
    pub api_url: String,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
    pub nautical_begin: Option<String>,
    pub nautical_end: Option<String>,
}

#[derive(Debug, Clone, Default, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct TransitConfig {
    pub url: Option<String>,
    pub api_key: Option<String>,
    /// Header carrying the key.
    pub api_key_header: Option<String>,
}

#[derive(Debug, Clone, Default, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct BikesConfig {
    /// GBFS `station_status.json` URL.
    pub status_url: Option<String>,
    pub stations: Vec<BikeStationConfig>,
}

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct BikeStationConfig {
    pub name: String,
    pub station_id: String,
}

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct ArtSlotConfig {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct FontsConfig {
    /// Extra `.ttf`/`.otf` files loaded on top of the system fonts.
    pub dir: Option<PathBuf>,
    pub family: Option<String>,
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:1312".to_string(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            timezone: "Europe/Paris".to_string(),
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            latitude: 48.8566,
            longitude: 2.3522,
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            forecast_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            icon_base_url: None,
        }
    }
}

impl Default for TwilightConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.sunrise-sunset.org/json".to_string(),
            sunrise: None,
            sunset: None,
            nautical_begin: None,
            nautical_end: None,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { timeout_secs: 5 }
    }
}

// ---------------------------------------------------------------------------
// Helper methods
// ---------------------------------------------------------------------------

impl Config {
    /// Display timezone. An unknown zone name falls back to UTC.
    pub fn timezone(&self) -> Tz {
        self.display.timezone.parse().unwrap_or(Tz::UTC)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch.timeout_secs.max(1))
    }

    /// Landmarks pinned in the config file, if all four are present and valid.
    pub fn fixed_landmarks(&self) -> Option<TwilightLandmarks> {
        let t = &self.twilight;
        TwilightLandmarks::from_hhmm(
            t.sunrise.as_deref()?,
            t.sunset.as_deref()?,
            t.nautical_begin.as_deref()?,
            t.nautical_end.as_deref()?,
        )
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }

    /// Deserialize from a TOML string.
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Read a config file. A missing file yields the defaults; an unreadable
    /// or invalid one is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("parse config {}", path.display()))
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

/// `~/.config/status-panel/`, honouring `$XDG_CONFIG_HOME`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join(APP_NAME);
    }
    home_dir().join(".config").join(APP_NAME)
}

pub fn default_config_path() -> PathBuf {
    config_dir().join("config.toml")
}

fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
