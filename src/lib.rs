//! Fraud Scoring Engine Library
//!
//! A deterministic, rule-based transaction fraud scorer: raw records are
//! normalized by the parser, turned into a fixed feature set, aggregated into
//! a weighted risk score and thresholded into a `fraud` / `legitimate` label.

pub mod batch;
pub mod config;
pub mod error;
pub mod feature_extractor;
pub mod metrics;
pub mod models;
pub mod parser;
pub mod types;

pub use batch::BatchCoordinator;
pub use config::AppConfig;
pub use error::{BatchError, ConfigurationError, MalformedInputError};
pub use feature_extractor::{FeatureExtractor, FeatureSet};
pub use models::engine::FraudEngine;
pub use types::{
    batch::{BatchEntry, BatchResult, BatchSummary},
    prediction::{Prediction, PredictionResult},
    transaction::{ParsedRecord, TransactionRecord},
};
