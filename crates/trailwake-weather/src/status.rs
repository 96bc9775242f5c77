//! Hazard status classification.
//!
//! Each physical metric reduces to a bounded three-state signal through one
//! shared threshold comparison; the per-metric functions only choose the
//! threshold table, the direction of "worse", and the message wording.
//! Formatting helpers render `—` for anything non-finite so a missing metric
//! never breaks the display.

use serde::{Deserialize, Serialize};
use trailwake_core::{ClassifierConfig, ThresholdPair};

use crate::dawn::{check_daylight_needed, DaylightCheck};
use crate::types::DawnInfo;

/// Bounded three-state hazard signal, ordered by severity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Ok,
    Yield,
    Warning,
}

/// One hazard signal for display. `message` is set only for Yield/Warning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusIcon {
    pub status: Status,
    pub message: Option<String>,
}

impl StatusIcon {
    pub fn ok() -> Self {
        Self {
            status: Status::Ok,
            message: None,
        }
    }

    fn flagged(status: Status, message: String) -> Self {
        Self {
            status,
            message: Some(message),
        }
    }
}

/// Which side of the threshold pair is hazardous.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// e.g. wet-bulb temperature, precipitation probability
    HigherIsWorse,
    /// e.g. wind chill
    LowerIsWorse,
}

/// Compare one metric against its caution/hazard thresholds.
///
/// Non-finite values classify as Ok: an unavailable metric is displayed as
/// `—`, not treated as a hazard.
pub fn classify_metric(value: f64, thresholds: ThresholdPair, direction: Direction) -> Status {
    if !value.is_finite() {
        return Status::Ok;
    }
    match direction {
        Direction::HigherIsWorse => {
            if value >= thresholds.hazard {
                Status::Warning
            } else if value >= thresholds.caution {
                Status::Yield
            } else {
                Status::Ok
            }
        }
        Direction::LowerIsWorse => {
            if value <= thresholds.hazard {
                Status::Warning
            } else if value <= thresholds.caution {
                Status::Yield
            } else {
                Status::Ok
            }
        }
    }
}

/// NWS wind chill in Fahrenheit.
///
/// Defined only for `temp_f <= 50` and `wind_mph >= 3`; outside that range
/// the formula does not apply and no value (hence no icon) is produced.
pub fn wind_chill_f(temp_f: f64, wind_mph: f64) -> Option<f64> {
    if !temp_f.is_finite() || !wind_mph.is_finite() || temp_f > 50.0 || wind_mph < 3.0 {
        return None;
    }
    let v = wind_mph.powf(0.16);
    Some(35.74 + 0.6215 * temp_f - 35.75 * v + 0.4275 * temp_f * v)
}

/// Stull (2011) wet-bulb temperature approximation, from dry-bulb Celsius
/// and relative humidity percentage.
pub fn wet_bulb_c(temp_c: f64, rh_pct: f64) -> f64 {
    temp_c * (0.151977 * (rh_pct + 8.313659).sqrt()).atan() + (temp_c + rh_pct).atan()
        - (rh_pct - 1.676331).atan()
        + 0.00391838 * rh_pct.powf(1.5) * (0.023101 * rh_pct).atan()
        - 4.686035
}

pub fn fahrenheit_to_celsius(temp_f: f64) -> f64 {
    (temp_f - 32.0) * 5.0 / 9.0
}

/// Wind chill hazard signal, or `None` when wind chill is not applicable.
pub fn wind_status(temp_f: f64, wind_mph: f64, config: &ClassifierConfig) -> Option<StatusIcon> {
    let chill = wind_chill_f(temp_f, wind_mph)?;
    let status = classify_metric(chill, config.wind_chill_f, Direction::LowerIsWorse);
    Some(match status {
        Status::Ok => StatusIcon::ok(),
        _ => StatusIcon::flagged(status, format!("Wind chill {}", format_temp(Some(chill)))),
    })
}

/// Wet-bulb heat-stress signal from dry-bulb Celsius and relative humidity.
pub fn wet_bulb_status(temp_c: f64, rh_pct: f64, config: &ClassifierConfig) -> StatusIcon {
    let wet_bulb = wet_bulb_c(temp_c, rh_pct);
    let status = classify_metric(wet_bulb, config.wet_bulb_c, Direction::HigherIsWorse);
    match status {
        Status::Ok => StatusIcon::ok(),
        _ => StatusIcon::flagged(status, format!("Wet-bulb {:.0}°C", wet_bulb)),
    }
}

/// Precipitation-probability signal from the raw percentage.
pub fn precip_status(pop_pct: f64, config: &ClassifierConfig) -> StatusIcon {
    let status = classify_metric(pop_pct, config.precip_pct, Direction::HigherIsWorse);
    match status {
        Status::Ok => StatusIcon::ok(),
        _ => StatusIcon::flagged(
            status,
            format!("Precipitation {}", format_pop(Some(pop_pct))),
        ),
    }
}

/// Daylight signal: Ok when the run starts after dawn (or no data), Yield
/// for a pre-dawn start, Warning for a deep pre-dawn start.
pub fn dawn_status(
    run_start_minutes: Option<i64>,
    dawn: Option<&DawnInfo>,
    config: &ClassifierConfig,
) -> StatusIcon {
    let check: DaylightCheck = check_daylight_needed(run_start_minutes, dawn);
    if !check.needed {
        return StatusIcon::ok();
    }
    let status = if check.margin_min.unwrap_or(0) > config.dawn_warning_margin_min {
        Status::Warning
    } else {
        Status::Yield
    };
    StatusIcon {
        status,
        message: check.message,
    }
}

/// Overall hazard badge: the worst status among the given signals.
pub fn overall_status(icons: &[StatusIcon]) -> Status {
    icons
        .iter()
        .map(|icon| icon.status)
        .max()
        .unwrap_or(Status::Ok)
}

fn format_metric(value: Option<f64>, suffix: &str) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.0}{}", v, suffix),
        _ => "—".to_string(),
    }
}

/// "76°F", or "—" when the value is absent or non-finite.
pub fn format_temp(value: Option<f64>) -> String {
    format_metric(value, "°F")
}

/// "12 mph", or "—" when the value is absent or non-finite.
pub fn format_wind(value: Option<f64>) -> String {
    format_metric(value, " mph")
}

/// "30%", or "—" when the value is absent or non-finite.
pub fn format_pop(value: Option<f64>) -> String {
    format_metric(value, "%")
}
