//! Type definitions for the fraud scoring engine

pub mod batch;
pub mod prediction;
pub mod transaction;

pub use batch::{BatchEntry, BatchOutcome, BatchResult, BatchSummary, RecordError};
pub use prediction::{Prediction, PredictionResult, RiskLevel, RiskLevelThresholds};
pub use transaction::{ParsedRecord, TransactionRecord};
