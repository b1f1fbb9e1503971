//! Prediction output data structures

use crate::feature_extractor::FeatureSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Categorical label assigned to a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Prediction {
    Fraud,
    Legitimate,
}

impl Prediction {
    pub fn is_fraud(&self) -> bool {
        matches!(self, Prediction::Fraud)
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prediction::Fraud => f.write_str("fraud"),
            Prediction::Legitimate => f.write_str("legitimate"),
        }
    }
}

/// Risk level classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Band a risk score; anything under `thresholds.medium` is `Low`
    pub fn from_score(score: f64, thresholds: &RiskLevelThresholds) -> Self {
        if score >= thresholds.critical {
            RiskLevel::Critical
        } else if score >= thresholds.high {
            RiskLevel::High
        } else if score >= thresholds.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// Lower bounds of each risk band.
///
/// Every score below `medium` is `Low`; `low` only anchors the ordering
/// check in config validation and is reported by
/// [`FraudEngine::model_info`](crate::models::engine::FraudEngine::model_info).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskLevelThresholds {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
    pub critical: f64,
}

impl Default for RiskLevelThresholds {
    fn default() -> Self {
        Self {
            low: 0.3,
            medium: 0.5,
            high: 0.7,
            critical: 0.9,
        }
    }
}

/// Outcome of evaluating one transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub prediction: Prediction,
    /// Distance-from-threshold certainty, 0.0 - 1.0
    pub confidence: f64,
    /// Weighted indicator sum, 0.0 - 1.0
    pub risk_score: f64,
    pub features: FeatureSet,
    pub risk_level: RiskLevel,
    /// Human-readable names of the indicators that fired
    pub risk_factors: Vec<String>,
    pub threshold_used: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_from_score() {
        let thresholds = RiskLevelThresholds::default();

        assert_eq!(RiskLevel::from_score(0.1, &thresholds), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(0.5, &thresholds), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(0.75, &thresholds), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(0.95, &thresholds), RiskLevel::Critical);
    }

    #[test]
    fn test_scores_below_low_band_are_low() {
        let thresholds = RiskLevelThresholds::default();
        assert_eq!(RiskLevel::from_score(0.0, &thresholds), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(thresholds.low, &thresholds), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(thresholds.medium, &thresholds), RiskLevel::Medium);
    }

    #[test]
    fn test_prediction_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Prediction::Fraud).unwrap(),
            "\"fraud\""
        );
        assert_eq!(
            serde_json::to_string(&Prediction::Legitimate).unwrap(),
            "\"legitimate\""
        );
        assert_eq!(Prediction::Fraud.to_string(), "fraud");
        assert!(!Prediction::Legitimate.is_fraud());
    }
}
