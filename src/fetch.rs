//! Upstream fetches for one render.
//!
//! All sources are queried concurrently and joined before layout, so a render
//! waits for the slowest source, not the sum of all of them. Each request is
//! bounded by the client timeout. A source that fails degrades to its
//! default value and reports why through [`SourceStatus`]; nothing here
//! aborts a render.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use futures_util::future::join_all;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use url::Url;

use crate::art;
use crate::calendar::{select_agenda, with_placeholder};
use crate::circadian::TwilightLandmarks;
use crate::config::Config;
use crate::model::{
    ArtSlot, BikeStation, DashboardData, Fetched, ImageData, SourceStatus, TransitSummary,
};
use crate::protocol::{ForecastResponse, StationStatusResponse, TransitResponse, TwilightResponse};
use crate::weather::WeatherReading;

const DEFAULT_KEY_HEADER: &str = "apikey";

/// Shared HTTP client. Cheap to clone.
#[derive(Clone)]
pub struct Fetcher {
    client: reqwest::Client,
}

/// Raw results of one fetch round, before agenda selection.
#[derive(Debug)]
pub struct Gathered {
    pub weather: Fetched<WeatherReading>,
    pub weather_icon: Fetched<Option<ImageData>>,
    pub landmarks: Fetched<TwilightLandmarks>,
    /// One entry per configured calendar URL; `None` when that feed failed.
    pub feeds: Vec<Fetched<Option<String>>>,
    pub departures: Fetched<Vec<u32>>,
    pub stations: Fetched<Vec<BikeStation>>,
    pub art: Vec<ArtSlot>,
}

impl Fetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("status-panel/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build http client")?;
        Ok(Self { client })
    }

    /// Fetch everything for a render at the current instant and resolve it.
    pub async fn dashboard(&self, config: &Config) -> DashboardData {
        let now = Utc::now().with_timezone(&config.timezone());
        let gathered = self.gather(config, now).await;
        gathered.report();
        gathered.into_dashboard(now)
    }

    /// Query every configured source at once.
    pub async fn gather(&self, config: &Config, now: DateTime<Tz>) -> Gathered {
        let (weather, landmarks, feeds, departures, stations, art) = tokio::join!(
            self.weather_with_icon(config),
            self.landmarks(config, now),
            self.calendars(&config.calendar.urls),
            self.departures(config),
            self.stations(config),
            art::load_slots(&config.art),
        );
        let (weather, weather_icon) = weather;

        Gathered {
            weather,
            weather_icon,
            landmarks,
            feeds,
            departures,
            stations,
            art,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        header: Option<(&str, &str)>,
    ) -> Result<T> {
        let mut request = self.client.get(url);
        if let Some((name, value)) = header {
            request = request.header(name, value);
        }
        let response = request
            .send()
            .await
            .context("request failed")?
            .error_for_status()?;
        response.json::<T>().await.context("decode json")
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("request failed")?
            .error_for_status()?;
        Ok(response.bytes().await.context("read body")?.to_vec())
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("request failed")?
            .error_for_status()?;
        response.text().await.context("read body")
    }

    async fn weather_with_icon(
        &self,
        config: &Config,
    ) -> (Fetched<WeatherReading>, Fetched<Option<ImageData>>) {
        let weather = match forecast_url(config) {
            Ok(url) => match self.get_json::<ForecastResponse>(url.as_str(), None).await {
                Ok(resp) => Fetched::ok(resp.into_reading()),
                Err(e) => Fetched::fallback(WeatherReading::default(), format!("{e:#}")),
            },
            Err(e) => Fetched::fallback(WeatherReading::default(), format!("{e:#}")),
        };

        let icon = match &config.weather.icon_base_url {
            None => Fetched::with_status(None, SourceStatus::Disabled),
            Some(base) => {
                let url = format!(
                    "{}/{}.svg",
                    base.trim_end_matches('/'),
                    weather.value.kind().icon_name()
                );
                match self.get_bytes(&url).await {
                    Ok(bytes) => Fetched::ok(Some(ImageData {
                        mime: "image/svg+xml",
                        bytes,
                    })),
                    Err(e) => Fetched::fallback(None, format!("{url}: {e:#}")),
                }
            }
        };

        (weather, icon)
    }

    async fn landmarks(&self, config: &Config, now: DateTime<Tz>) -> Fetched<TwilightLandmarks> {
        if let Some(fixed) = config.fixed_landmarks() {
            return Fetched::ok(fixed);
        }
        let tz = now.timezone();
        let result = async {
            let url = twilight_url(config, now)?;
            let resp: TwilightResponse = self.get_json(url.as_str(), None).await?;
            resp.landmarks(tz)
                .ok_or_else(|| anyhow::anyhow!("twilight status {:?}", resp.status))
        }
        .await;
        match result {
            Ok(landmarks) => Fetched::ok(landmarks),
            Err(e) => Fetched::fallback(TwilightLandmarks::default(), format!("{e:#}")),
        }
    }

    async fn calendars(&self, urls: &[String]) -> Vec<Fetched<Option<String>>> {
        join_all(urls.iter().map(|url| async move {
            match self.get_text(url).await {
                Ok(text) => Fetched::ok(Some(text)),
                Err(e) => Fetched::fallback(None, format!("{url}: {e:#}")),
            }
        }))
        .await
    }

    async fn departures(&self, config: &Config) -> Fetched<Vec<u32>> {
        let Some(url) = config.transit.url.as_deref() else {
            return Fetched::with_status(Vec::new(), SourceStatus::Disabled);
        };
        let Some(key) = config.transit.api_key.as_deref() else {
            return Fetched::with_status(Vec::new(), SourceStatus::MissingKey);
        };
        let header = config
            .transit
            .api_key_header
            .as_deref()
            .unwrap_or(DEFAULT_KEY_HEADER);
        match self.get_json::<TransitResponse>(url, Some((header, key))).await {
            Ok(resp) => Fetched::ok(resp.minutes()),
            Err(e) => Fetched::fallback(Vec::new(), format!("{e:#}")),
        }
    }

    async fn stations(&self, config: &Config) -> Fetched<Vec<BikeStation>> {
        let unknown = || {
            config
                .bikes
                .stations
                .iter()
                .map(|s| BikeStation {
                    name: s.name.clone(),
                    bikes: None,
                })
                .collect::<Vec<_>>()
        };
        let Some(url) = config.bikes.status_url.as_deref() else {
            return Fetched::with_status(unknown(), SourceStatus::Disabled);
        };
        match self.get_json::<StationStatusResponse>(url, None).await {
            Ok(resp) => Fetched::ok(
                config
                    .bikes
                    .stations
                    .iter()
                    .map(|s| BikeStation {
                        name: s.name.clone(),
                        bikes: resp.bikes_at(&s.station_id),
                    })
                    .collect(),
            ),
            Err(e) => Fetched::fallback(unknown(), format!("{e:#}")),
        }
    }
}

fn forecast_url(config: &Config) -> Result<Url> {
    Url::parse_with_params(
        &config.weather.forecast_url,
        &[
            ("latitude", config.location.latitude.to_string()),
            ("longitude", config.location.longitude.to_string()),
            ("current", "temperature_2m,weather_code".to_string()),
            (
                "daily",
                "precipitation_probability_max,precipitation_sum".to_string(),
            ),
            ("timezone", config.display.timezone.clone()),
            ("forecast_days", "1".to_string()),
        ],
    )
    .context("invalid forecast url")
}

fn twilight_url(config: &Config, now: DateTime<Tz>) -> Result<Url> {
    Url::parse_with_params(
        &config.twilight.api_url,
        &[
            ("lat", config.location.latitude.to_string()),
            ("lng", config.location.longitude.to_string()),
            ("date", now.format("%Y-%m-%d").to_string()),
            ("formatted", "0".to_string()),
        ],
    )
    .context("invalid twilight url")
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

impl Gathered {
    /// Log every source that did not deliver.
    pub fn report(&self) {
        report_status("weather", &self.weather.status);
        report_status("weather_icon", &self.weather_icon.status);
        report_status("twilight", &self.landmarks.status);
        for feed in &self.feeds {
            report_status("calendar", &feed.status);
        }
        report_status("transit", &self.departures.status);
        report_status("bikes", &self.stations.status);
        debug!(
            target: "fetch",
            available = self.art.iter().filter(|slot| slot.is_available()).count(),
            configured = self.art.len(),
            "art slots"
        );
    }

    /// Resolve into the view-model: pick the agenda from the feeds that
    /// arrived and substitute placeholders.
    pub fn into_dashboard(self, now: DateTime<Tz>) -> DashboardData {
        let feeds: Vec<&str> = self
            .feeds
            .iter()
            .filter_map(|f| f.value.as_deref())
            .collect();
        let agenda = with_placeholder(select_agenda(&feeds, now));

        DashboardData {
            now,
            agenda,
            weather: self.weather.value,
            weather_icon: self.weather_icon.value,
            landmarks: self.landmarks.value,
            transit: TransitSummary {
                departures: self.departures.value,
                stations: self.stations.value,
            },
            art: self.art,
        }
    }
}

fn report_status(source: &str, status: &SourceStatus) {
    match status {
        SourceStatus::Ok => debug!(target: "fetch", source, "source ok"),
        SourceStatus::Fallback(reason) => {
            warn!(target: "fetch", source, "using fallback: {reason}")
        }
        SourceStatus::MissingKey => info!(target: "fetch", source, "no API key configured"),
        SourceStatus::Disabled => debug!(target: "fetch", source, "source not configured"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
