//! Thresholding of risk scores into labels

use crate::types::prediction::{Prediction, RiskLevel, RiskLevelThresholds};

/// Label and certainty for one score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub prediction: Prediction,
    pub confidence: f64,
}

/// Threshold classifier.
///
/// A score is `fraud` only when strictly above the threshold, so a score
/// sitting exactly on it is `legitimate`.
#[derive(Debug, Clone)]
pub struct Classifier {
    threshold: f64,
    risk_levels: RiskLevelThresholds,
}

impl Classifier {
    pub fn new(threshold: f64, risk_levels: RiskLevelThresholds) -> Self {
        Self {
            threshold,
            risk_levels,
        }
    }

    /// Label the score; confidence grows with the distance from the threshold.
    pub fn classify(&self, risk_score: f64) -> Classification {
        let risk_score = if risk_score.is_finite() { risk_score } else { 0.0 };

        let prediction = if risk_score > self.threshold {
            Prediction::Fraud
        } else {
            Prediction::Legitimate
        };
        let distance = (risk_score - self.threshold).abs();
        let confidence = if distance.is_finite() {
            (0.5 + distance).clamp(0.0, 1.0)
        } else {
            0.5
        };

        Classification {
            prediction,
            confidence,
        }
    }

    pub fn risk_level(&self, risk_score: f64) -> RiskLevel {
        RiskLevel::from_score(risk_score, &self.risk_levels)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn risk_levels(&self) -> &RiskLevelThresholds {
        &self.risk_levels
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(0.5, RiskLevelThresholds::default())
    }
}
