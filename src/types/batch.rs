//! Batch evaluation output

use crate::error::MalformedInputError;
use crate::types::prediction::PredictionResult;
use serde::Serialize;
use serde_json::{Map, Value};

/// A record the parser rejected, reported in place of a prediction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordError {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip)]
    pub kind: MalformedInputError,
}

impl From<MalformedInputError> for RecordError {
    fn from(kind: MalformedInputError) -> Self {
        Self {
            error: kind.to_string(),
            field: kind.field().map(str::to_string),
            kind,
        }
    }
}

/// Per-record outcome inside a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BatchOutcome {
    Scored {
        #[serde(flatten)]
        result: PredictionResult,
        original_data: Map<String, Value>,
    },
    Rejected(RecordError),
}

impl BatchOutcome {
    pub fn result(&self) -> Option<&PredictionResult> {
        match self {
            BatchOutcome::Scored { result, .. } => Some(result),
            BatchOutcome::Rejected(_) => None,
        }
    }

    pub fn error(&self) -> Option<&RecordError> {
        match self {
            BatchOutcome::Scored { .. } => None,
            BatchOutcome::Rejected(err) => Some(err),
        }
    }
}

/// One batch entry; `transaction_id` is the 1-based input position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchEntry {
    pub transaction_id: usize,
    #[serde(flatten)]
    pub outcome: BatchOutcome,
}

/// Aggregate counts over one batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    /// Every input record, rejected ones included
    pub total_transactions: usize,
    pub fraud_detected: usize,
    pub legitimate_transactions: usize,
    pub parse_errors: usize,
    /// `100 * fraud_detected / total_transactions`, one decimal
    pub fraud_percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl BatchSummary {
    /// Summarize entries that are already in input order
    pub fn from_entries(entries: &[BatchEntry], filename: Option<String>) -> Self {
        let total_transactions = entries.len();
        let mut fraud_detected = 0;
        let mut legitimate_transactions = 0;
        let mut parse_errors = 0;

        for entry in entries {
            match entry.outcome.result() {
                Some(result) if result.prediction.is_fraud() => fraud_detected += 1,
                Some(_) => legitimate_transactions += 1,
                None => parse_errors += 1,
            }
        }

        let fraud_percentage = if total_transactions == 0 {
            0.0
        } else {
            let raw = 100.0 * fraud_detected as f64 / total_transactions as f64;
            (raw * 10.0).round() / 10.0
        };

        Self {
            total_transactions,
            fraud_detected,
            legitimate_transactions,
            parse_errors,
            fraud_percentage,
            filename,
        }
    }
}

/// Ordered entries paired with their summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResult {
    pub results: Vec<BatchEntry>,
    pub summary: BatchSummary,
}
