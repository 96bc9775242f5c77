use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use trailwake_core::CoordinateError;

/// WMO weather codes that mark a day as snowy.
/// See: https://open-meteo.com/en/docs#weathervariables
pub const SNOW_CODES: [i32; 6] = [71, 73, 75, 77, 85, 86];

/// Whether a daily WMO weather code indicates snow.
pub fn is_snow_code(code: i32) -> bool {
    SNOW_CODES.contains(&code)
}

/// A validated geographic coordinate pair.
///
/// Construction is the only way to obtain one, so invalid coordinates can
/// never reach the forecast or dawn clients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    lat: f64,
    lon: f64,
}

impl Coordinates {
    /// Validate and construct.
    ///
    /// # Errors
    /// Returns `CoordinateError` when either component is out of range or
    /// non-finite.
    pub fn new(lat: f64, lon: f64) -> Result<Self, CoordinateError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(CoordinateError::LatitudeOutOfRange(lat));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(CoordinateError::LongitudeOutOfRange(lon));
        }
        Ok(Self { lat, lon })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Coordinates rounded to a stable ~100 m bucket, for cache keys.
    pub fn cache_bucket(&self) -> String {
        format!("{:.3},{:.3}", self.lat, self.lon)
    }
}

/// One hour of normalized forecast data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HourlyRecord {
    pub time: NaiveDateTime,
    pub temp_f: f64,
    pub humidity_pct: f64,
    pub wind_mph: f64,
    pub precip_prob_pct: f64,
    pub weather_code: i32,
}

/// One calendar day's precipitation and reference evapotranspiration.
///
/// Missing fields default to 0, never null, to keep the arithmetic total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    #[serde(default)]
    pub rain_mm: f64,
    #[serde(default)]
    pub snow_mm: f64,
    #[serde(default)]
    pub et0_mm: f64,
    /// Hours over which the day's precipitation fell; 0 when unreported.
    /// Drives the intensity boost: the same millimeters over fewer hours
    /// score higher.
    #[serde(default)]
    pub precip_hours: f64,
}

impl DailyRecord {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            rain_mm: 0.0,
            snow_mm: 0.0,
            et0_mm: 0.0,
            precip_hours: 0.0,
        }
    }

    /// Raw precipitation for the day, before any model weighting.
    pub fn raw_precip_mm(&self) -> f64 {
        self.rain_mm + self.snow_mm
    }
}

/// The lookback window fed to the wetness model.
///
/// Constructed fresh per forecast call; immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WetnessInputs {
    pub records: Vec<DailyRecord>,
    pub lookback_days: u32,
}

impl WetnessInputs {
    /// The zero-value window: no records, assume dry.
    pub fn empty(lookback_days: u32) -> Self {
        Self {
            records: Vec::new(),
            lookback_days,
        }
    }
}

/// Discrete trail-condition label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrailCondition {
    #[default]
    Dry,
    SlightlyWet,
    Wet,
    VeryWet,
}

impl TrailCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrailCondition::Dry => "Dry",
            TrailCondition::SlightlyWet => "Slightly Wet",
            TrailCondition::Wet => "Wet",
            TrailCondition::VeryWet => "Very Wet",
        }
    }
}

impl std::fmt::Display for TrailCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Output of the wetness model. Derived, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WetnessInterpretation {
    pub is_wet: bool,
    pub wet_days: u32,
    pub avg_precip: f64,
    pub label: TrailCondition,
}

impl WetnessInterpretation {
    /// The conservative "assume dry" interpretation used when no
    /// precipitation data exists.
    pub fn dry() -> Self {
        Self {
            is_wet: false,
            wet_days: 0,
            avg_precip: 0.0,
            label: TrailCondition::Dry,
        }
    }
}

/// Normalized forecast bundle for a coordinate and target date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherData {
    pub hourly: Vec<HourlyRecord>,
    pub daily: Vec<DailyRecord>,
}

impl WeatherData {
    /// The hourly record closest to the given minutes-since-midnight on the
    /// given date, if any.
    pub fn hourly_nearest(&self, date: NaiveDate, minutes: i64) -> Option<&HourlyRecord> {
        self.hourly
            .iter()
            .filter(|h| h.time.date() == date)
            .min_by_key(|h| {
                let h_minutes =
                    i64::from(chrono::Timelike::hour(&h.time)) * 60
                        + i64::from(chrono::Timelike::minute(&h.time));
                (h_minutes - minutes).abs()
            })
    }
}

/// The computed dawn instant and the timezone it must be interpreted in.
///
/// Never compared across timezones without conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DawnInfo {
    pub date: DateTime<Utc>,
    pub tz: String,
}
