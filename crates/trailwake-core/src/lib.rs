//! Core types for the Trailwake weather subsystem: configuration and the
//! centralized error taxonomy shared by the forecast and dawn clients.

pub mod config;
pub mod error;

pub use config::{
    CacheConfig, ClassifierConfig, Config, ThresholdPair, ValidationResult, WetnessParams,
};
pub use error::{AppError, ConfigError, CoordinateError, DawnError, ForecastError};

use anyhow::Result;

/// Initialize logging for the subsystem.
///
/// Hosts that install their own subscriber can skip this.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Trailwake core initialized");
    Ok(())
}
