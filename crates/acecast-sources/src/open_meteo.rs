// Open-Meteo hourly forecast client.

use acecast_core::config::Config;
use acecast_core::gateway::{SourceError, WeatherGateway};
use acecast_core::model::{HourlySample, Venue, WeatherSnapshot};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use crate::http::{build_client, endpoint, get_json};

const HOURLY_FIELDS: &str = "temperature_2m,relative_humidity_2m,wind_speed_10m,wind_direction_10m";

#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    hourly: Option<HourlySeries>,
}

/// Parallel arrays indexed by hour. Individual readings can be null.
#[derive(Debug, Deserialize)]
struct HourlySeries {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    relative_humidity_2m: Vec<Option<f64>>,
    #[serde(default)]
    wind_speed_10m: Vec<Option<f64>>,
    #[serde(default)]
    wind_direction_10m: Vec<Option<f64>>,
}

/// Hourly samples whose timestamp falls on `date`. Hours missing any of the
/// four readings are skipped.
pub fn hourly_samples(response: ForecastResponse, date: NaiveDate) -> Vec<HourlySample> {
    let Some(hourly) = response.hourly else {
        return Vec::new();
    };
    let day_prefix = date.format("%Y-%m-%d").to_string();
    let at = |series: &[Option<f64>], i: usize| series.get(i).copied().flatten();

    hourly
        .time
        .iter()
        .enumerate()
        .filter(|(_, time)| time.starts_with(&day_prefix))
        .filter_map(|(i, _)| {
            Some(HourlySample {
                temperature: at(&hourly.temperature_2m, i)?,
                humidity: at(&hourly.relative_humidity_2m, i)?,
                wind_speed: at(&hourly.wind_speed_10m, i)?,
                wind_direction: at(&hourly.wind_direction_10m, i)?,
            })
        })
        .collect()
}

pub struct OpenMeteoClient {
    http: reqwest::Client,
    base_url: String,
}

impl OpenMeteoClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self::new(
            build_client(&config.sources)?,
            config.sources.weather_base_url.clone(),
        ))
    }
}

#[async_trait]
impl WeatherGateway for OpenMeteoClient {
    async fn weather(
        &self,
        venue: &Venue,
        date: NaiveDate,
    ) -> Result<WeatherSnapshot, SourceError> {
        let (latitude, longitude) = venue
            .coordinates()
            .ok_or(SourceError::MissingCoordinates { venue_id: venue.id })?;

        let day = date.format("%Y-%m-%d").to_string();
        let response: ForecastResponse = get_json(
            &self.http,
            &endpoint(&self.base_url, "forecast"),
            &[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("hourly", HOURLY_FIELDS.to_string()),
                ("temperature_unit", "fahrenheit".to_string()),
                ("wind_speed_unit", "mph".to_string()),
                ("timezone", "auto".to_string()),
                ("start_date", day.clone()),
                ("end_date", day),
            ],
        )
        .await?;

        let samples = hourly_samples(response, date);
        debug!(venue_id = venue.id, %date, samples = samples.len(), "hourly weather");
        WeatherSnapshot::mean_of(&samples).ok_or(SourceError::NoHourlySamples { date })
    }
}
