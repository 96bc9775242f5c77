//! Weather awareness for Trailwake
//!
//! Ingests raw atmospheric forecast records, derives a time-decayed
//! trail-wetness score, classifies daylight sufficiency with timezone-aware
//! dawn computation, and reduces the physical metrics to a bounded
//! three-state hazard signal. Every external fetch passes through a
//! TTL cache over an injectable key/value store.

pub mod cache;
pub mod dawn;
pub mod forecast;
pub mod status;
pub mod store;
pub mod types;
pub mod wetness;

pub use cache::TtlCache;
pub use dawn::{check_daylight_needed, DawnClient, DaylightCheck};
pub use forecast::ForecastClient;
pub use status::{
    dawn_status, format_pop, format_temp, format_wind, overall_status, precip_status,
    wet_bulb_status, wind_status, Status, StatusIcon,
};
pub use store::{KvStore, MemoryStore, SqliteStore};
pub use types::*;
pub use wetness::{compute_wetness, interpret};
