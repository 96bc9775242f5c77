//! Dawn client: fetches the civil dawn instant for a coordinate from an
//! external ephemeris service, cache-backed, and compares it against a
//! planned run start in the dawn's own timezone.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;
use reqwest::Client;
use serde::Deserialize;
use trailwake_core::DawnError;

use crate::cache::TtlCache;
use crate::store::KvStore;
use crate::types::{Coordinates, DawnInfo};

const DAWN_API_URL: &str = "https://api.sunrise-sunset.org/json";
const DEFAULT_TTL: Duration = Duration::from_secs(6 * 3600);

#[derive(Debug, Deserialize)]
struct DawnResponse {
    status: String,
    results: Option<DawnResults>,
}

#[derive(Debug, Deserialize)]
struct DawnResults {
    /// Dawn instant as unix seconds.
    dawn: f64,
}

/// Result of comparing a planned run start against dawn.
#[derive(Debug, Clone, PartialEq)]
pub struct DaylightCheck {
    pub needed: bool,
    /// Minutes between run start and dawn; set only when `needed`.
    pub margin_min: Option<i64>,
    pub message: Option<String>,
}

impl DaylightCheck {
    fn not_needed() -> Self {
        Self {
            needed: false,
            margin_min: None,
            message: None,
        }
    }
}

/// Does a run starting at `run_start_minutes` (minutes since midnight, in
/// the dawn's timezone) begin before dawn?
///
/// Absent inputs mean no warning, not a hazard. A start exactly at dawn
/// still needs light; the message distinguishes "(at dawn)" from
/// "(N min before dawn)". A start after dawn never does.
pub fn check_daylight_needed(
    run_start_minutes: Option<i64>,
    dawn: Option<&DawnInfo>,
) -> DaylightCheck {
    let (Some(start), Some(dawn)) = (run_start_minutes, dawn) else {
        return DaylightCheck::not_needed();
    };

    let zone: Tz = match dawn.tz.parse() {
        Ok(zone) => zone,
        Err(_) => {
            tracing::warn!("Unresolvable timezone {:?} in dawn info", dawn.tz);
            return DaylightCheck::not_needed();
        }
    };

    let local = dawn.date.with_timezone(&zone);
    let dawn_minutes = i64::from(local.hour()) * 60 + i64::from(local.minute());

    if start > dawn_minutes {
        return DaylightCheck::not_needed();
    }

    let margin = dawn_minutes - start;
    let detail = if margin == 0 {
        "at dawn".to_string()
    } else {
        format!("{margin} min before dawn")
    };

    DaylightCheck {
        needed: true,
        margin_min: Some(margin),
        message: Some(format!("Headlamp recommended ({detail})")),
    }
}

/// Cache-backed client for the external dawn service.
#[derive(Clone)]
pub struct DawnClient<S> {
    client: Arc<Client>,
    base_url: String,
    cache: TtlCache<S>,
    ttl: Duration,
}

impl<S: KvStore> DawnClient<S> {
    pub fn new(cache: TtlCache<S>) -> Self {
        Self {
            client: Arc::new(Client::new()),
            base_url: DAWN_API_URL.to_string(),
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

    /// Fetch the dawn instant for a coordinate, interpreted in `tz`.
    ///
    /// The cache key carries the current calendar date in `tz`, so an entry
    /// is never reused across days even within its TTL.
    ///
    /// # Errors
    /// `DawnError::Fetch`/`Http` when the service is unreachable or
    /// unhealthy; `ApiStatus`, `InvalidTimestamp`, or `Parse` when it
    /// answered with garbage; `InvalidTimezone` when `tz` is not a known
    /// IANA zone.
    pub async fn fetch_dawn(&self, coords: &Coordinates, tz: &str) -> Result<DawnInfo, DawnError> {
        let zone: Tz = tz
            .parse()
            .map_err(|_| DawnError::InvalidTimezone(tz.to_string()))?;
        let today = Utc::now().with_timezone(&zone).date_naive();
        let key = format!("dawn:{}:{}:{}", coords.cache_bucket(), tz, today);

        if let Some(cached) = self.cache.load::<DawnInfo>(&key, self.ttl) {
            tracing::debug!("Dawn cache hit for {}", key);
            return Ok(cached);
        }

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("lat", coords.lat().to_string()),
                ("lng", coords.lon().to_string()),
                ("formatted", "0".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DawnError::Http {
                status: response.status().as_u16(),
            });
        }

        let text = response.text().await?;
        let body: DawnResponse =
            serde_json::from_str(&text).map_err(|e| DawnError::Parse(e.to_string()))?;

        if body.status != "OK" {
            return Err(DawnError::ApiStatus(body.status));
        }
        let results = body
            .results
            .ok_or_else(|| DawnError::Parse("missing results section".to_string()))?;

        if !results.dawn.is_finite() {
            return Err(DawnError::InvalidTimestamp(results.dawn));
        }
        let date: DateTime<Utc> = DateTime::from_timestamp(results.dawn as i64, 0)
            .ok_or(DawnError::InvalidTimestamp(results.dawn))?;

        let info = DawnInfo {
            date,
            tz: tz.to_string(),
        };
        self.cache.save(&key, &info);
        tracing::info!("Fetched dawn {} for {}", info.date, key);
        Ok(info)
    }
}
