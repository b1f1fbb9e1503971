//! Rule-based fraud engine: feature extraction, scoring and classification

use crate::config::{AppConfig, LocationPolicy, RiskWeights};
use crate::error::{ConfigurationError, MalformedInputError};
use crate::feature_extractor::{FeatureExtractor, FEATURE_SCHEMA_VERSION, SCORING_FEATURES};
use crate::models::classifier::Classifier;
use crate::models::scorer::RiskScorer;
use crate::parser;
use crate::types::prediction::{PredictionResult, RiskLevelThresholds};
use crate::types::transaction::TransactionRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

pub const MODEL_TYPE: &str = "Rule-based Fraud Detection";

/// Description of the loaded scoring model
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub model_type: &'static str,
    pub version: &'static str,
    pub feature_schema_version: u32,
    pub features: Vec<&'static str>,
    pub risk_factors: RiskWeights,
    pub fraud_threshold: f64,
    pub risk_levels: RiskLevelThresholds,
    pub location_policy: LocationPolicy,
    pub generated_at: DateTime<Utc>,
}

/// Stateless scoring pipeline.
///
/// Built once from a validated configuration and shared read-only between
/// callers; evaluation never mutates it.
#[derive(Debug, Clone)]
pub struct FraudEngine {
    extractor: FeatureExtractor,
    scorer: RiskScorer,
    classifier: Classifier,
    location_policy: LocationPolicy,
}

impl FraudEngine {
    /// Create a new engine, refusing invalid configuration
    pub fn new(config: &AppConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;

        info!(
            fraud_threshold = config.detection.fraud_threshold,
            weights = ?config.weights,
            location_policy = ?config.features.location_policy,
            "Fraud engine initialized"
        );

        Ok(Self {
            extractor: FeatureExtractor::new(&config.features),
            scorer: RiskScorer::new(config.weights),
            classifier: Classifier::new(
                config.detection.fraud_threshold,
                config.detection.risk_levels.clone(),
            ),
            location_policy: config.features.location_policy,
        })
    }

    /// Evaluate a raw JSON transaction (flat or `data`-nested)
    pub fn evaluate_single(&self, raw: &Value) -> Result<PredictionResult, MalformedInputError> {
        let parsed = parser::parse_value(raw)?;
        Ok(self.evaluate_record(&parsed.record))
    }

    /// Run the full pipeline on an already-normalized record
    pub fn evaluate_record(&self, record: &TransactionRecord) -> PredictionResult {
        let features = self.extractor.extract(record);
        let contributions = self.scorer.contributions(&features);
        let risk_score = self.scorer.score(&features);
        let classification = self.classifier.classify(risk_score);

        debug!(
            risk_score = risk_score,
            prediction = %classification.prediction,
            confidence = classification.confidence,
            "Transaction scored"
        );

        PredictionResult {
            prediction: classification.prediction,
            confidence: classification.confidence,
            risk_score,
            risk_level: self.classifier.risk_level(risk_score),
            risk_factors: contributions
                .iter()
                .map(|c| c.factor.label().to_string())
                .collect(),
            threshold_used: self.classifier.threshold(),
            features,
        }
    }

    pub fn model_info(&self) -> ModelInfo {
        ModelInfo {
            model_type: MODEL_TYPE,
            version: env!("CARGO_PKG_VERSION"),
            feature_schema_version: FEATURE_SCHEMA_VERSION,
            features: SCORING_FEATURES.to_vec(),
            risk_factors: *self.scorer.weights(),
            fraud_threshold: self.classifier.threshold(),
            risk_levels: self.classifier.risk_levels().clone(),
            location_policy: self.location_policy,
            generated_at: Utc::now(),
        }
    }
}
