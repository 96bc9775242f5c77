//! Centralized error types for the Trailwake weather subsystem.
//!
//! This module provides a typed error hierarchy that:
//! - Lets callers distinguish "service down" from "service returned garbage"
//! - Provides user-friendly messages suitable for UI display
//! - Preserves full error context for debugging/logging
//!
//! Nothing here retries automatically; retry policy belongs to the caller.
//! No failure in this subsystem is fatal to the host application.

use thiserror::Error;

/// Top-level subsystem error type.
///
/// All errors in the weather subsystem are convertible to this type.
/// Use `user_message()` to get a UI-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Forecast error: {0}")]
    Forecast(#[from] ForecastError),

    #[error("Dawn error: {0}")]
    Dawn(#[from] DawnError),

    #[error("Coordinate error: {0}")]
    Coordinate(#[from] CoordinateError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display in the UI.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Forecast(e) => e.user_message(),
            AppError::Dawn(e) => e.user_message(),
            AppError::Coordinate(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Io(_) => "A file operation failed. Please try again.",
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }
}

/// Forecast service errors.
///
/// Transport failures (`Fetch`) and protocol failures (`Http`, `Parse`) are
/// always surfaced; absence of forecast data is handled upstream as a benign
/// zero-result, never through this type.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Network unreachable, connection reset, request aborted.
    #[error("Forecast request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The service answered with a non-OK HTTP status.
    #[error("Forecast service returned HTTP {status}")]
    Http { status: u16 },

    /// The service answered 200 with a body we cannot understand.
    #[error("Malformed forecast response: {0}")]
    Parse(String),
}

impl ForecastError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ForecastError::Fetch(_) => "Unable to reach the forecast service. Check your connection.",
            ForecastError::Http { status } if *status >= 500 => {
                "The forecast service is having issues. Please try again later."
            }
            ForecastError::Http { .. } => "The forecast request failed. Please try again.",
            ForecastError::Parse(_) => "Received an unexpected forecast response.",
        }
    }
}

/// Dawn/ephemeris service errors.
///
/// Each variant is distinct so callers can message appropriately:
/// `Fetch`/`Http` mean the service is unreachable or unhealthy, `ApiStatus`
/// and `InvalidTimestamp` mean it answered but returned garbage.
#[derive(Debug, Error)]
pub enum DawnError {
    /// Network unreachable, connection reset, request aborted.
    #[error("Dawn request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The service answered with a non-OK HTTP status.
    #[error("Dawn service returned HTTP {status}")]
    Http { status: u16 },

    /// The payload's own status field was something other than "OK".
    #[error("Dawn service rejected the request with status {0:?}")]
    ApiStatus(String),

    /// The dawn timestamp was non-finite or outside the representable range.
    #[error("Dawn service returned an invalid timestamp: {0}")]
    InvalidTimestamp(f64),

    /// The IANA timezone string could not be resolved.
    #[error("Unknown timezone: {0}")]
    InvalidTimezone(String),

    /// The service answered 200 with a body we cannot understand.
    #[error("Malformed dawn response: {0}")]
    Parse(String),
}

impl DawnError {
    pub fn user_message(&self) -> &'static str {
        match self {
            DawnError::Fetch(_) => "Unable to reach the dawn service. Check your connection.",
            DawnError::Http { status } if *status >= 500 => {
                "The dawn service is having issues. Please try again later."
            }
            DawnError::Http { .. } => "The dawn request failed. Please try again.",
            DawnError::ApiStatus(_) => "The dawn service had no data for this location.",
            DawnError::InvalidTimestamp(_) | DawnError::Parse(_) => {
                "Received an unexpected dawn response."
            }
            DawnError::InvalidTimezone(_) => "Unrecognized timezone. Check your settings.",
        }
    }
}

/// Coordinate validation errors.
///
/// Invalid coordinates must never reach the forecast or dawn clients, so
/// validation happens at construction time.
#[derive(Debug, Error)]
pub enum CoordinateError {
    #[error("Latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("Longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

impl CoordinateError {
    pub fn user_message(&self) -> &'static str {
        match self {
            CoordinateError::LatitudeOutOfRange(_) => "Latitude must be between -90 and 90.",
            CoordinateError::LongitudeOutOfRange(_) => "Longitude must be between -180 and 180.",
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
        }
    }
}
