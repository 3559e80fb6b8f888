//! Upstream JSON payloads.
//!
//! Every source the panel polls is described here as a `Deserialize` type,
//! with a conversion into the domain value the dashboard consumes. Fields are
//! `#[serde(default)]` so a partial payload still yields whatever it carries.

use chrono::{DateTime, FixedOffset};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::circadian::TwilightLandmarks;
use crate::weather::WeatherReading;

/// Most departures the transit panel lists.
pub const MAX_DEPARTURES: usize = 3;

// ---------------------------------------------------------------------------
// Open-Meteo forecast
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ForecastResponse {
    #[serde(default)]
    pub current: ForecastCurrent,
    #[serde(default)]
    pub daily: ForecastDaily,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ForecastCurrent {
    pub temperature_2m: Option<f64>,
    pub weather_code: Option<u8>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ForecastDaily {
    #[serde(default)]
    pub precipitation_probability_max: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_sum: Vec<Option<f64>>,
}

impl ForecastResponse {
    /// Today's values: the current conditions plus the first daily entry.
    pub fn into_reading(self) -> WeatherReading {
        WeatherReading {
            temperature_c: self.current.temperature_2m,
            weather_code: self.current.weather_code,
            precip_probability: self
                .daily
                .precipitation_probability_max
                .first()
                .copied()
                .flatten(),
            precip_sum_mm: self.daily.precipitation_sum.first().copied().flatten(),
        }
    }
}

// ---------------------------------------------------------------------------
// sunrise-sunset.org (formatted=0)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Clone)]
pub struct TwilightResponse {
    #[serde(default)]
    pub status: String,
    pub results: TwilightResults,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TwilightResults {
    pub sunrise: String,
    pub sunset: String,
    pub nautical_twilight_begin: String,
    pub nautical_twilight_end: String,
}

impl TwilightResponse {
    /// Convert the RFC 3339 instants into wall-clock times in `tz`.
    pub fn landmarks(&self, tz: Tz) -> Option<TwilightLandmarks> {
        if !self.status.is_empty() && self.status != "OK" {
            return None;
        }
        let local = |s: &str| {
            DateTime::<FixedOffset>::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&tz).time())
        };
        let r = &self.results;
        Some(TwilightLandmarks {
            sunrise: local(&r.sunrise)?,
            sunset: local(&r.sunset)?,
            nautical_twilight_begin: local(&r.nautical_twilight_begin)?,
            nautical_twilight_end: local(&r.nautical_twilight_end)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Transit departures
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Clone, Default)]
pub struct TransitResponse {
    #[serde(default)]
    pub departures: Vec<Departure>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Departure {
    #[serde(rename = "minutesUntil")]
    pub minutes_until: i64,
}

impl TransitResponse {
    /// Upcoming departures in source order, already-left ones dropped.
    pub fn minutes(&self) -> Vec<u32> {
        self.departures
            .iter()
            .filter_map(|d| u32::try_from(d.minutes_until).ok())
            .take(MAX_DEPARTURES)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// GBFS station_status.json
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StationStatusResponse {
    #[serde(default)]
    pub data: StationStatusData,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StationStatusData {
    #[serde(default)]
    pub stations: Vec<StationStatus>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StationStatus {
    /// Some operators publish numeric ids, others strings.
    pub station_id: serde_json::Value,
    #[serde(default)]
    pub num_bikes_available: Option<u32>,
}

impl StationStatusResponse {
    pub fn bikes_at(&self, station_id: &str) -> Option<u32> {
        self.data
            .stations
            .iter()
            .find(|s| match &s.station_id {
                serde_json::Value::String(id) => id == station_id,
                other => other.to_string() == station_id,
            })
            .and_then(|s| s.num_bikes_available)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
