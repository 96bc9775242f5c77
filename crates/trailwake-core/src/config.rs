use serde::{Deserialize, Serialize};

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Subsystem configuration.
///
/// Every numeric boundary that is a product decision rather than a physical
/// constant (classifier thresholds, wetness curve coefficients, cache TTLs)
/// lives here so hosts can tune them without touching the models.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Cache TTLs
    #[serde(default)]
    pub cache: CacheConfig,

    /// Hazard classifier thresholds
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Trail wetness model coefficients
    #[serde(default)]
    pub wetness: WetnessParams,
}

impl Config {
    /// Validate the configuration, collecting all problems rather than
    /// failing on the first.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.cache.forecast_ttl_secs == 0 {
            result.add_error("cache.forecast_ttl_secs", "must be greater than zero");
        }
        if self.cache.dawn_ttl_secs == 0 {
            result.add_error("cache.dawn_ttl_secs", "must be greater than zero");
        }
        if self.cache.dawn_ttl_secs > 24 * 3600 {
            result.add_warning(
                "cache.dawn_ttl_secs",
                "longer than a day; dawn is never reused across calendar days anyway",
            );
        }

        // Wind chill: lower is worse, so hazard must sit below caution.
        if self.classifier.wind_chill_f.hazard > self.classifier.wind_chill_f.caution {
            result.add_error(
                "classifier.wind_chill_f",
                "hazard threshold must be at or below the caution threshold",
            );
        }
        // Wet bulb and precipitation: higher is worse.
        if self.classifier.wet_bulb_c.hazard < self.classifier.wet_bulb_c.caution {
            result.add_error(
                "classifier.wet_bulb_c",
                "hazard threshold must be at or above the caution threshold",
            );
        }
        if self.classifier.precip_pct.hazard < self.classifier.precip_pct.caution {
            result.add_error(
                "classifier.precip_pct",
                "hazard threshold must be at or above the caution threshold",
            );
        }
        if self.classifier.dawn_warning_margin_min < 0 {
            result.add_error("classifier.dawn_warning_margin_min", "must be non-negative");
        }

        if self.wetness.lookback_days == 0 {
            result.add_error("wetness.lookback_days", "must be at least 1");
        }
        if !(self.wetness.decay_base > 0.0 && self.wetness.decay_base < 1.0) {
            result.add_error(
                "wetness.decay_base",
                "must be strictly between 0 and 1 so older days always weigh less",
            );
        }
        if self.wetness.wet_day_threshold_mm < 0.0 {
            result.add_error("wetness.wet_day_threshold_mm", "must be non-negative");
        }
        if self.wetness.intensity_max_boost < 1.0 {
            result.add_error(
                "wetness.intensity_max_boost",
                "must be at least 1 (boost never penalizes)",
            );
        }
        if !(self.wetness.winter_et_factor > 0.0 && self.wetness.winter_et_factor <= 1.0) {
            result.add_error("wetness.winter_et_factor", "must be in (0, 1]");
        }

        result
    }
}

/// Cache TTLs, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Forecast responses stay fresh for one UI session but not much longer.
    #[serde(default = "default_forecast_ttl_secs")]
    pub forecast_ttl_secs: u64,

    /// Dawn moves slowly day to day; the cache key also carries the calendar
    /// date so an entry is never reused across days.
    #[serde(default = "default_dawn_ttl_secs")]
    pub dawn_ttl_secs: u64,
}

fn default_forecast_ttl_secs() -> u64 {
    15 * 60
}

fn default_dawn_ttl_secs() -> u64 {
    6 * 3600
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            forecast_ttl_secs: default_forecast_ttl_secs(),
            dawn_ttl_secs: default_dawn_ttl_secs(),
        }
    }
}

/// A caution/hazard threshold pair for one metric.
///
/// Whether "worse" means above or below the pair depends on the metric and is
/// decided by the classifier, not stored here.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ThresholdPair {
    pub caution: f64,
    pub hazard: f64,
}

/// Status classifier thresholds.
///
/// Defaults are starting points, not recovered constants; hosts should tune
/// them to their audience.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Wind chill in Fahrenheit. Lower is worse.
    pub wind_chill_f: ThresholdPair,

    /// Wet-bulb temperature in Celsius. Higher is worse.
    pub wet_bulb_c: ThresholdPair,

    /// Precipitation probability in percent. Higher is worse.
    pub precip_pct: ThresholdPair,

    /// Minutes before dawn beyond which a pre-dawn start escalates from
    /// Yield to Warning.
    pub dawn_warning_margin_min: i64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            wind_chill_f: ThresholdPair {
                caution: 20.0,
                hazard: 0.0,
            },
            wet_bulb_c: ThresholdPair {
                caution: 21.0,
                hazard: 25.0,
            },
            precip_pct: ThresholdPair {
                caution: 30.0,
                hazard: 60.0,
            },
            dawn_warning_margin_min: 45,
        }
    }
}

/// Trail wetness model coefficients.
///
/// The curve shape (decay base, boost multiplier range, seasonal factor) is a
/// tunable parameter set validated against fixtures, not a derivation from
/// first principles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WetnessParams {
    /// How many past days of records feed the model.
    pub lookback_days: u32,

    /// Per-day multiplicative decay applied to older contributions.
    /// Strictly less than 1 so yesterday's storm matters more than one five
    /// days prior.
    pub decay_base: f64,

    /// Raw rain+snow above this many mm makes a day count as "wet".
    pub wet_day_threshold_mm: f64,

    /// ET0 drying multiplier during winter months (dormant vegetation, low
    /// solar drying).
    pub winter_et_factor: f64,

    /// Months in which `winter_et_factor` applies.
    pub winter_months: Vec<u32>,

    /// Fraction of snowfall water equivalent that reaches the trail as melt.
    pub snow_melt_factor: f64,

    /// Precipitation rate (mm per reported precip hour) considered ordinary;
    /// faster events earn an intensity boost.
    pub intensity_ref_mm_per_hour: f64,

    /// Upper bound on the intensity boost multiplier.
    pub intensity_max_boost: f64,
}

impl Default for WetnessParams {
    fn default() -> Self {
        Self {
            lookback_days: 5,
            decay_base: 0.85,
            wet_day_threshold_mm: 0.2,
            winter_et_factor: 0.5,
            winter_months: vec![12, 1, 2],
            snow_melt_factor: 0.6,
            intensity_ref_mm_per_hour: 1.5,
            intensity_max_boost: 1.6,
        }
    }
}
