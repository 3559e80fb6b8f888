//! The view-model handed to the layout engine.
//!
//! Every field is already resolved: failed sources have been replaced by
//! their placeholder values before a `DashboardData` is built.

use chrono::DateTime;
use chrono_tz::Tz;

use crate::calendar::AgendaItem;
use crate::circadian::TwilightLandmarks;
use crate::weather::WeatherReading;

/// How a fetched value was obtained.
///
/// Returned next to the data so the caller decides what to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceStatus {
    Ok,
    /// The source failed; the value is its documented default.
    Fallback(String),
    /// The source needs an API key that is not configured.
    MissingKey,
    /// The source is not configured at all.
    Disabled,
}

/// A value plus the status of the source it came from.
#[derive(Debug, Clone)]
pub struct Fetched<T> {
    pub value: T,
    pub status: SourceStatus,
}

impl<T> Fetched<T> {
    pub fn ok(value: T) -> Self {
        Self {
            value,
            status: SourceStatus::Ok,
        }
    }

    pub fn fallback(value: T, reason: impl Into<String>) -> Self {
        Self {
            value,
            status: SourceStatus::Fallback(reason.into()),
        }
    }

    pub fn with_status(value: T, status: SourceStatus) -> Self {
        Self { value, status }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BikeStation {
    pub name: String,
    pub bikes: Option<u32>,
}

impl BikeStation {
    pub fn label(&self) -> String {
        match self.bikes {
            Some(n) => format!("{}: {n}", self.name),
            None => format!("{}: ?", self.name),
        }
    }
}

/// Next departures and the configured bike-share stations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitSummary {
    /// Minutes until each departure, at most three.
    pub departures: Vec<u32>,
    pub stations: Vec<BikeStation>,
}

impl TransitSummary {
    /// One display line per departure; a single placeholder when empty.
    pub fn departure_lines(&self) -> Vec<String> {
        if self.departures.is_empty() {
            return vec!["No departures".to_string()];
        }
        self.departures
            .iter()
            .map(|m| match m {
                0 => "Now".to_string(),
                m => format!("{m} min"),
            })
            .collect()
    }

    pub fn bike_line(&self) -> String {
        self.stations
            .iter()
            .map(BikeStation::label)
            .collect::<Vec<_>>()
            .join("   ")
    }
}

/// Raw bytes of an image with its MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// A named art slot and its image, if one could be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtSlot {
    pub name: String,
    pub image: Option<ImageData>,
}

impl ArtSlot {
    pub fn is_available(&self) -> bool {
        self.image.is_some()
    }
}

/// Everything one render needs, resolved.
#[derive(Debug, Clone)]
pub struct DashboardData {
    pub now: DateTime<Tz>,
    pub agenda: Vec<AgendaItem>,
    pub weather: WeatherReading,
    pub weather_icon: Option<ImageData>,
    pub landmarks: TwilightLandmarks,
    pub transit: TransitSummary,
    pub art: Vec<ArtSlot>,
}
