//! Forecast client: retrieves hourly and daily atmospheric records for a
//! coordinate from an Open-Meteo-style service, normalizes them, and is
//! cache-backed. Temperatures come back in Fahrenheit and wind in mph to
//! match the classifier formulas; precipitation is in millimeters.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use reqwest::Client;
use serde::Deserialize;
use trailwake_core::ForecastError;

use crate::cache::TtlCache;
use crate::store::KvStore;
use crate::types::{
    is_snow_code, Coordinates, DailyRecord, HourlyRecord, WeatherData, WetnessInputs,
};

const OPEN_METEO_URL: &str = "https://api.open-meteo.com/v1/forecast";
const DEFAULT_TTL: Duration = Duration::from_secs(15 * 60);

const HOURLY_FIELDS: &str =
    "temperature_2m,relative_humidity_2m,wind_speed_10m,precipitation_probability,weather_code";
const DAILY_FIELDS: &str =
    "rain_sum,snowfall_sum,precipitation_hours,et0_fao_evapotranspiration,weather_code";

const HOURLY_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    hourly: Option<HourlySection>,
    daily: Option<DailySection>,
}

/// Parallel arrays keyed by field name, with an ISO `time` array.
#[derive(Debug, Deserialize)]
struct HourlySection {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    temperature_2m: Vec<f64>,
    #[serde(default)]
    relative_humidity_2m: Vec<f64>,
    #[serde(default)]
    wind_speed_10m: Vec<f64>,
    #[serde(default)]
    precipitation_probability: Vec<f64>,
    #[serde(default)]
    weather_code: Vec<i32>,
}

#[derive(Debug, Deserialize)]
struct DailySection {
    #[serde(default)]
    time: Vec<String>,
    rain_sum: Option<Vec<f64>>,
    #[serde(default)]
    snowfall_sum: Vec<f64>,
    #[serde(default)]
    precipitation_hours: Vec<f64>,
    #[serde(default)]
    et0_fao_evapotranspiration: Vec<f64>,
    #[serde(default)]
    weather_code: Vec<i32>,
}

/// Cache-backed client for the external forecast service.
#[derive(Clone)]
pub struct ForecastClient<S> {
    client: Arc<Client>,
    base_url: String,
    cache: TtlCache<S>,
    ttl: Duration,
}

impl<S: KvStore> ForecastClient<S> {
    pub fn new(cache: TtlCache<S>) -> Self {
        Self {
            client: Arc::new(Client::new()),
            base_url: OPEN_METEO_URL.to_string(),
            cache,
            ttl: DEFAULT_TTL,
        }
    }

    /// Point at a different endpoint (tests, self-hosted mirrors).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Fetch normalized hourly and daily records bracketing `date` in `tz`.
    ///
    /// # Errors
    /// `ForecastError::Fetch` on transport failure, `Http` on a non-OK
    /// status, `Parse` on an unreadable body. No retry happens here.
    pub async fn fetch_weather_around(
        &self,
        coords: &Coordinates,
        date: NaiveDate,
        tz: &str,
    ) -> Result<WeatherData, ForecastError> {
        let key = format!("wx:{}:{}", coords.cache_bucket(), date);
        if let Some(cached) = self.cache.load::<WeatherData>(&key, self.ttl) {
            tracing::debug!("Forecast cache hit for {}", key);
            return Ok(cached);
        }

        let response = self.request(coords, date, date, tz).await?;
        let data = normalize_weather(&response);
        self.cache.save(&key, &data);
        tracing::info!(
            "Fetched forecast for {} ({} hourly, {} daily records)",
            key,
            data.hourly.len(),
            data.daily.len()
        );
        Ok(data)
    }

    /// Fetch the daily lookback window feeding the wetness model:
    /// `lookback_days` records ending on `date`.
    ///
    /// A well-formed response with no daily-precipitation section yields the
    /// zero-value window (assume dry) rather than an error.
    ///
    /// # Errors
    /// Same taxonomy as [`fetch_weather_around`](Self::fetch_weather_around).
    pub async fn fetch_wetness_inputs(
        &self,
        coords: &Coordinates,
        date: NaiveDate,
        tz: &str,
        lookback_days: u32,
    ) -> Result<WetnessInputs, ForecastError> {
        let key = format!("wet:{}:{}:{}", coords.cache_bucket(), date, lookback_days);
        if let Some(cached) = self.cache.load::<WetnessInputs>(&key, self.ttl) {
            tracing::debug!("Wetness cache hit for {}", key);
            return Ok(cached);
        }

        let span = i64::from(lookback_days.max(1)) - 1;
        let start = date - chrono::Duration::days(span);
        let response = self.request(coords, start, date, tz).await?;
        let inputs = normalize_wetness(&response, lookback_days);
        self.cache.save(&key, &inputs);
        Ok(inputs)
    }

    async fn request(
        &self,
        coords: &Coordinates,
        start: NaiveDate,
        end: NaiveDate,
        tz: &str,
    ) -> Result<ForecastResponse, ForecastError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latitude", coords.lat().to_string()),
                ("longitude", coords.lon().to_string()),
                ("hourly", HOURLY_FIELDS.to_string()),
                ("daily", DAILY_FIELDS.to_string()),
                ("temperature_unit", "fahrenheit".to_string()),
                ("wind_speed_unit", "mph".to_string()),
                ("precipitation_unit", "mm".to_string()),
                ("timezone", tz.to_string()),
                ("start_date", start.to_string()),
                ("end_date", end.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ForecastError::Http {
                status: response.status().as_u16(),
            });
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| ForecastError::Parse(e.to_string()))
    }
}

fn normalize_weather(response: &ForecastResponse) -> WeatherData {
    let hourly = response
        .hourly
        .as_ref()
        .map(normalize_hourly)
        .unwrap_or_default();
    let daily = response
        .daily
        .as_ref()
        .map(normalize_daily)
        .unwrap_or_default();
    WeatherData { hourly, daily }
}

fn normalize_hourly(section: &HourlySection) -> Vec<HourlyRecord> {
    let mut records = Vec::with_capacity(section.time.len());
    for (i, raw_time) in section.time.iter().enumerate() {
        let time = match NaiveDateTime::parse_from_str(raw_time, HOURLY_TIME_FORMAT) {
            Ok(time) => time,
            Err(_) => {
                tracing::debug!("Skipping hourly entry with bad time {:?}", raw_time);
                continue;
            }
        };
        records.push(HourlyRecord {
            time,
            temp_f: value_at(&section.temperature_2m, i),
            humidity_pct: value_at(&section.relative_humidity_2m, i),
            wind_mph: value_at(&section.wind_speed_10m, i),
            precip_prob_pct: value_at(&section.precipitation_probability, i),
            weather_code: section.weather_code.get(i).copied().unwrap_or(0),
        });
    }
    records
}

fn normalize_daily(section: &DailySection) -> Vec<DailyRecord> {
    let rain_sum = section.rain_sum.as_deref().unwrap_or(&[]);
    let mut records = Vec::with_capacity(section.time.len());
    for (i, raw_date) in section.time.iter().enumerate() {
        let date = match raw_date.parse::<NaiveDate>() {
            Ok(date) => date,
            Err(_) => {
                tracing::debug!("Skipping daily entry with bad date {:?}", raw_date);
                continue;
            }
        };

        let mut rain_mm = rain_sum.get(i).copied().unwrap_or(0.0);
        // Open-Meteo reports snowfall in centimeters.
        let mut snow_mm = value_at(&section.snowfall_sum, i) * 10.0;
        let code = section.weather_code.get(i).copied().unwrap_or(0);

        // Some responses code a day as snow while reporting its water as
        // rain; reclassify so the melt factor applies.
        if is_snow_code(code) && snow_mm == 0.0 && rain_mm > 0.0 {
            snow_mm = rain_mm;
            rain_mm = 0.0;
        }

        records.push(DailyRecord {
            date,
            rain_mm,
            snow_mm,
            et0_mm: value_at(&section.et0_fao_evapotranspiration, i),
            precip_hours: value_at(&section.precipitation_hours, i),
        });
    }
    records
}

/// Daily records for the wetness window. Absence of the daily-precipitation
/// section means "assume dry": a conservative default for display, a genuine
/// risk if relied on for safety.
fn normalize_wetness(response: &ForecastResponse, lookback_days: u32) -> WetnessInputs {
    let Some(daily) = response.daily.as_ref() else {
        return WetnessInputs::empty(lookback_days);
    };
    if daily.rain_sum.is_none() {
        return WetnessInputs::empty(lookback_days);
    }

    WetnessInputs {
        records: normalize_daily(daily),
        lookback_days,
    }
}

fn value_at(values: &[f64], i: usize) -> f64 {
    values.get(i).copied().unwrap_or(0.0)
}
