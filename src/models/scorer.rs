//! Weighted aggregation of indicator features into a risk score

use crate::config::RiskWeights;
use crate::feature_extractor::FeatureSet;

/// Indicators that contribute to the risk score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskFactor {
    HighAmount,
    UnusualTime,
    SuspiciousMerchant,
    HighRiskLocation,
}

impl RiskFactor {
    /// All factors, in weight-table order
    pub const ALL: [RiskFactor; 4] = [
        RiskFactor::HighAmount,
        RiskFactor::UnusualTime,
        RiskFactor::SuspiciousMerchant,
        RiskFactor::HighRiskLocation,
    ];

    /// Feature name, matching the `FeatureSet` field
    pub fn name(&self) -> &'static str {
        match self {
            RiskFactor::HighAmount => "high_amount",
            RiskFactor::UnusualTime => "unusual_time",
            RiskFactor::SuspiciousMerchant => "suspicious_merchant",
            RiskFactor::HighRiskLocation => "high_risk_location",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskFactor::HighAmount => "High amount",
            RiskFactor::UnusualTime => "Unusual time",
            RiskFactor::SuspiciousMerchant => "Suspicious merchant",
            RiskFactor::HighRiskLocation => "High-risk location",
        }
    }

    fn fired(&self, features: &FeatureSet) -> bool {
        match self {
            RiskFactor::HighAmount => features.high_amount,
            RiskFactor::UnusualTime => features.unusual_time,
            RiskFactor::SuspiciousMerchant => features.suspicious_merchant,
            RiskFactor::HighRiskLocation => features.high_risk_location,
        }
    }

    fn weight(&self, weights: &RiskWeights) -> f64 {
        match self {
            RiskFactor::HighAmount => weights.high_amount,
            RiskFactor::UnusualTime => weights.unusual_time,
            RiskFactor::SuspiciousMerchant => weights.suspicious_merchant,
            RiskFactor::HighRiskLocation => weights.high_risk_location,
        }
    }
}

/// Contribution of one fired indicator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskContribution {
    pub factor: RiskFactor,
    pub weight: f64,
}

/// Combines indicator features into a single risk score.
#[derive(Debug, Clone)]
pub struct RiskScorer {
    weights: RiskWeights,
}

impl RiskScorer {
    /// Create a new risk scorer with the given weight table.
    pub fn new(weights: RiskWeights) -> Self {
        Self { weights }
    }

    /// Fired indicators with their weights, in weight-table order.
    pub fn contributions(&self, features: &FeatureSet) -> Vec<RiskContribution> {
        RiskFactor::ALL
            .iter()
            .filter(|factor| factor.fired(features))
            .map(|&factor| RiskContribution {
                factor,
                weight: factor.weight(&self.weights),
            })
            .collect()
    }

    /// Weighted sum of fired indicators, clamped to [0, 1].
    pub fn score(&self, features: &FeatureSet) -> f64 {
        let raw: f64 = self
            .contributions(features)
            .iter()
            .map(|c| c.weight)
            .sum();

        if raw.is_finite() {
            raw.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Get configured weights.
    pub fn weights(&self) -> &RiskWeights {
        &self.weights
    }
}

impl Default for RiskScorer {
    fn default() -> Self {
        Self::new(RiskWeights::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature_extractor::FeatureExtractor;
    use crate::types::transaction::TransactionRecord;

    fn features(high_amount: bool, unusual_time: bool, merchant: bool, location: bool) -> FeatureSet {
        let mut features =
            FeatureExtractor::default().extract(&TransactionRecord::new(10.0).unwrap());
        features.high_amount = high_amount;
        features.unusual_time = unusual_time;
        features.suspicious_merchant = merchant;
        features.high_risk_location = location;
        features
    }

    #[test]
    fn test_weighted_score() {
        let scorer = RiskScorer::default();

        assert_eq!(scorer.score(&features(false, false, false, false)), 0.0);
        assert!((scorer.score(&features(true, false, false, false)) - 0.3).abs() < 1e-9);
        assert!((scorer.score(&features(false, true, true, false)) - 0.5).abs() < 1e-9);
        assert!((scorer.score(&features(false, true, true, true)) - 0.7).abs() < 1e-9);
        assert!((scorer.score(&features(true, true, true, true)) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_is_clamped() {
        let scorer = RiskScorer::new(RiskWeights {
            high_amount: 0.9,
            unusual_time: 0.9,
            suspicious_merchant: 0.9,
            high_risk_location: 0.9,
        });
        assert_eq!(scorer.score(&features(true, true, true, true)), 1.0);

        let scorer = RiskScorer::new(RiskWeights {
            high_amount: -2.0,
            ..RiskWeights::default()
        });
        assert_eq!(scorer.score(&features(true, false, false, false)), 0.0);
    }

    #[test]
    fn test_contributions_in_table_order() {
        let scorer = RiskScorer::default();
        let contributions = scorer.contributions(&features(false, true, false, true));

        let names: Vec<_> = contributions.iter().map(|c| c.factor.name()).collect();
        assert_eq!(names, vec!["unusual_time", "high_risk_location"]);
        assert_eq!(contributions[0].weight, 0.2);
        assert_eq!(contributions[1].factor.label(), "High-risk location");
    }

    #[test]
    fn test_score_is_deterministic() {
        let scorer = RiskScorer::default();
        let f = features(true, false, true, false);
        assert_eq!(scorer.score(&f).to_bits(), scorer.score(&f).to_bits());
    }
}
