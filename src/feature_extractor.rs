//! Feature extraction for rule-based fraud scoring.
//!
//! Turns a normalized [`TransactionRecord`] into a fixed [`FeatureSet`]. The
//! four boolean indicators feed the risk scorer; the remaining fields are
//! descriptive and never contribute to the score.

use crate::config::{FeatureConfig, LocationPolicy, OffHoursWindow};
use crate::types::transaction::{normalize_text, TransactionRecord};
use serde::{Deserialize, Serialize};

/// Bumped whenever a field is added to or removed from [`FeatureSet`].
pub const FEATURE_SCHEMA_VERSION: u32 = 1;

/// Names of the indicators that take part in scoring, in weight-table order.
pub const SCORING_FEATURES: [&str; 4] = [
    "high_amount",
    "unusual_time",
    "suspicious_merchant",
    "high_risk_location",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountCategory {
    Micro,
    Small,
    Medium,
    Large,
    VeryLarge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MerchantCategory {
    Grocery,
    GasStation,
    Restaurant,
    Online,
    CashService,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeCategory {
    Morning,
    Afternoon,
    Evening,
    Night,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationCategory {
    Online,
    International,
    Atm,
    Domestic,
    Unknown,
}

/// Indicator features derived from one transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    pub amount: f64,
    pub high_amount: bool,
    pub unusual_time: bool,
    pub suspicious_merchant: bool,
    pub high_risk_location: bool,

    pub hour: Option<u8>,
    pub very_high_amount: bool,
    pub high_risk_card: bool,
    pub amount_category: AmountCategory,
    pub merchant_category: MerchantCategory,
    pub time_category: TimeCategory,
    pub location_category: LocationCategory,
}

/// Feature extractor built from an immutable [`FeatureConfig`].
///
/// Keyword lists are normalized once at construction so matching against the
/// already-normalized record text is plain substring containment.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    high_amount_threshold: f64,
    very_high_amount_threshold: f64,
    off_hours: OffHoursWindow,
    suspicious_merchants: Vec<String>,
    location_policy: LocationPolicy,
    high_risk_locations: Vec<String>,
    trusted_locations: Vec<String>,
    high_risk_card_types: Vec<String>,
}

fn normalize_all(values: &[String]) -> Vec<String> {
    values.iter().filter_map(|v| normalize_text(v)).collect()
}

fn contains_any(text: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| text.contains(k.as_str()))
}

fn contains_word(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

impl FeatureExtractor {
    /// Create a new feature extractor.
    pub fn new(config: &FeatureConfig) -> Self {
        Self {
            high_amount_threshold: config.high_amount_threshold,
            very_high_amount_threshold: config.very_high_amount_threshold,
            off_hours: config.off_hours,
            suspicious_merchants: normalize_all(&config.suspicious_merchants),
            location_policy: config.location_policy,
            high_risk_locations: normalize_all(&config.high_risk_locations),
            trusted_locations: normalize_all(&config.trusted_locations),
            high_risk_card_types: normalize_all(&config.high_risk_card_types),
        }
    }

    /// Extract features from a transaction. Never fails; absent optional
    /// fields produce the neutral value of each indicator.
    pub fn extract(&self, record: &TransactionRecord) -> FeatureSet {
        let amount = record.amount();
        let hour = record.hour();

        FeatureSet {
            amount,
            high_amount: amount > self.high_amount_threshold,
            unusual_time: hour.is_some_and(|h| self.off_hours.contains(h)),
            suspicious_merchant: record
                .merchant()
                .is_some_and(|m| contains_any(m, &self.suspicious_merchants)),
            high_risk_location: record
                .location()
                .is_some_and(|l| self.is_high_risk_location(l)),

            hour,
            very_high_amount: amount > self.very_high_amount_threshold,
            high_risk_card: record
                .card_type()
                .is_some_and(|c| self.high_risk_card_types.iter().any(|t| t == c)),
            amount_category: categorize_amount(amount),
            merchant_category: record
                .merchant()
                .map_or(MerchantCategory::Other, categorize_merchant),
            time_category: hour.map_or(TimeCategory::Unknown, categorize_hour),
            location_category: record
                .location()
                .map_or(LocationCategory::Unknown, categorize_location),
        }
    }

    fn is_high_risk_location(&self, location: &str) -> bool {
        match self.location_policy {
            LocationPolicy::HighRiskList => contains_any(location, &self.high_risk_locations),
            LocationPolicy::TrustedList => !contains_any(location, &self.trusted_locations),
        }
    }

    /// Get the names of the scoring indicators.
    pub fn feature_names(&self) -> &'static [&'static str] {
        &SCORING_FEATURES
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new(&FeatureConfig::default())
    }
}

fn categorize_amount(amount: f64) -> AmountCategory {
    if amount < 50.0 {
        AmountCategory::Micro
    } else if amount < 200.0 {
        AmountCategory::Small
    } else if amount < 1000.0 {
        AmountCategory::Medium
    } else if amount < 5000.0 {
        AmountCategory::Large
    } else {
        AmountCategory::VeryLarge
    }
}

fn categorize_merchant(merchant: &str) -> MerchantCategory {
    if contains_word(merchant, &["grocery", "supermarket", "food"]) {
        MerchantCategory::Grocery
    } else if contains_word(merchant, &["gas", "fuel", "station"]) {
        MerchantCategory::GasStation
    } else if contains_word(merchant, &["restaurant", "cafe", "dining"]) {
        MerchantCategory::Restaurant
    } else if contains_word(merchant, &["online", "web", "internet"]) {
        MerchantCategory::Online
    } else if contains_word(merchant, &["atm", "cash"]) {
        MerchantCategory::CashService
    } else {
        MerchantCategory::Other
    }
}

fn categorize_hour(hour: u8) -> TimeCategory {
    match hour {
        6..=11 => TimeCategory::Morning,
        12..=17 => TimeCategory::Afternoon,
        18..=22 => TimeCategory::Evening,
        _ => TimeCategory::Night,
    }
}

fn categorize_location(location: &str) -> LocationCategory {
    if contains_word(location, &["online", "internet", "web"]) {
        LocationCategory::Online
    } else if contains_word(location, &["foreign", "international", "overseas"]) {
        LocationCategory::International
    } else if location.contains("atm") {
        LocationCategory::Atm
    } else {
        LocationCategory::Domestic
    }
}
