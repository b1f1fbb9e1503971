//! Configuration management for the fraud scoring engine

use crate::error::ConfigurationError;
use crate::types::prediction::RiskLevelThresholds;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default location of the configuration file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Prefix for environment overrides, e.g. `FRAUD_ENGINE__WEIGHTS__HIGH_AMOUNT=0.25`
const ENV_PREFIX: &str = "FRAUD_ENGINE";

/// Upper bound on accumulated float error when checking the weight total
const WEIGHT_TOTAL_EPSILON: f64 = 1e-9;

/// How the location indicator is decided
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LocationPolicy {
    /// Flag locations containing any entry of `high_risk_locations`
    #[default]
    HighRiskList,
    /// Flag locations containing none of the entries of `trusted_locations`
    TrustedList,
}

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub detection: DetectionConfig,
    pub features: FeatureConfig,
    pub weights: RiskWeights,
    pub pipeline: PipelineConfig,
    pub logging: LoggingConfig,
}

/// Classification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Scores strictly above this value are labelled fraud
    pub fraud_threshold: f64,
    /// Bands used to attach a risk level to every prediction
    pub risk_levels: RiskLevelThresholds,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            fraud_threshold: 0.5,
            risk_levels: RiskLevelThresholds::default(),
        }
    }
}

/// Off-hours window `[start, end)` in hours of the day.
///
/// When `start > end` the window wraps past midnight; `start == end` is empty.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct OffHoursWindow {
    pub start: u8,
    pub end: u8,
}

impl OffHoursWindow {
    pub fn contains(&self, hour: u8) -> bool {
        if self.start <= self.end {
            hour >= self.start && hour < self.end
        } else {
            hour >= self.start || hour < self.end
        }
    }
}

impl Default for OffHoursWindow {
    fn default() -> Self {
        Self { start: 23, end: 6 }
    }
}

/// Feature extraction configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Amounts strictly above this fire `high_amount`
    pub high_amount_threshold: f64,
    /// Amounts strictly above this set the informational `very_high_amount`
    pub very_high_amount_threshold: f64,
    pub off_hours: OffHoursWindow,
    /// Substrings that mark a merchant as suspicious
    pub suspicious_merchants: Vec<String>,
    pub location_policy: LocationPolicy,
    pub high_risk_locations: Vec<String>,
    pub trusted_locations: Vec<String>,
    /// Card types reported as `high_risk_card` (informational)
    pub high_risk_card_types: Vec<String>,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            high_amount_threshold: 1000.0,
            very_high_amount_threshold: 5000.0,
            off_hours: OffHoursWindow::default(),
            suspicious_merchants: strings(&[
                "atm",
                "cash advance",
                "wire transfer",
                "crypto",
                "casino",
                "gambling",
                "adult entertainment",
                "unknown",
            ]),
            location_policy: LocationPolicy::HighRiskList,
            high_risk_locations: strings(&[
                "nigeria", "russia", "china", "offshore", "foreign", "unknown",
            ]),
            trusted_locations: Vec::new(),
            high_risk_card_types: strings(&["prepaid", "gift"]),
        }
    }
}

/// Weight of each indicator in the risk score
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RiskWeights {
    pub high_amount: f64,
    pub unusual_time: f64,
    pub suspicious_merchant: f64,
    pub high_risk_location: f64,
}

impl RiskWeights {
    /// Score reached when every indicator fires
    pub fn total(&self) -> f64 {
        self.high_amount + self.unusual_time + self.suspicious_merchant + self.high_risk_location
    }

    fn entries(&self) -> [(&'static str, f64); 4] {
        [
            ("high_amount", self.high_amount),
            ("unusual_time", self.unusual_time),
            ("suspicious_merchant", self.suspicious_merchant),
            ("high_risk_location", self.high_risk_location),
        ]
    }
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            high_amount: 0.3,
            unusual_time: 0.2,
            suspicious_merchant: 0.3,
            high_risk_location: 0.2,
        }
    }
}

/// Batch pipeline configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of concurrent workers for parallel batch evaluation
    pub workers: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { workers: 4 }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default file
    pub fn load() -> Result<Self> {
        Self::load_from_path(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from a specific path, apply environment overrides
    /// and validate the result. A missing file leaves the defaults in place;
    /// environment overrides still apply.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        app_config
            .validate()
            .context("Invalid configuration")?;

        Ok(app_config)
    }

    /// Check thresholds, weights and pipeline settings
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        check_unit("detection.fraud_threshold", self.detection.fraud_threshold)?;

        let levels = &self.detection.risk_levels;
        let bands = [levels.low, levels.medium, levels.high, levels.critical];
        let ascending = bands.windows(2).all(|pair| pair[0] <= pair[1]);
        if !ascending || bands.iter().any(|v| !(0.0..=1.0).contains(v)) {
            return Err(ConfigurationError::InvalidRiskLevels {
                low: levels.low,
                medium: levels.medium,
                high: levels.high,
                critical: levels.critical,
            });
        }

        check_amount(
            "features.high_amount_threshold",
            self.features.high_amount_threshold,
        )?;
        check_amount(
            "features.very_high_amount_threshold",
            self.features.very_high_amount_threshold,
        )?;

        let window = self.features.off_hours;
        if window.start > 23 || window.end > 23 {
            return Err(ConfigurationError::InvalidOffHours {
                start: window.start,
                end: window.end,
            });
        }

        if self.features.location_policy == LocationPolicy::TrustedList
            && self.features.trusted_locations.iter().all(|l| l.trim().is_empty())
        {
            return Err(ConfigurationError::EmptyTrustedLocations);
        }

        for (name, value) in self.weights.entries() {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigurationError::InvalidWeight { name, value });
            }
        }
        let total = self.weights.total();
        if total <= 0.0 || total > 1.0 + WEIGHT_TOTAL_EPSILON {
            return Err(ConfigurationError::WeightTotal { total });
        }

        if self.pipeline.workers == 0 {
            return Err(ConfigurationError::NoWorkers);
        }

        Ok(())
    }
}

fn check_unit(name: &'static str, value: f64) -> Result<(), ConfigurationError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigurationError::OutOfRange {
            name,
            value,
            min: 0.0,
            max: 1.0,
        })
    }
}

fn check_amount(name: &'static str, value: f64) -> Result<(), ConfigurationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigurationError::OutOfRange {
            name,
            value,
            min: 0.0,
            max: f64::MAX,
        })
    }
}
