//! Error types surfaced by the scoring engine

use thiserror::Error;

/// A raw record (or a whole request body) that cannot be turned into a
/// [`TransactionRecord`](crate::types::transaction::TransactionRecord).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedInputError {
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid value for field `{field}`: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("malformed CSV row {row}: {reason}")]
    InvalidCsv { row: usize, reason: String },
}

impl MalformedInputError {
    pub(crate) fn invalid_field(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Name of the offending field, when the failure is tied to one.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingField(field) => Some(*field),
            Self::InvalidField { field, .. } => Some(field.as_str()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for MalformedInputError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidJson(err.to_string())
    }
}

/// Invalid thresholds, weights or pipeline settings. Fatal at startup.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("{name} must be a finite value in [{min}, {max}], got {value}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("weight `{name}` must be finite and non-negative, got {value}")]
    InvalidWeight { name: &'static str, value: f64 },

    #[error("weights must sum to a value in (0, 1], got {total}")]
    WeightTotal { total: f64 },

    #[error("off-hours window bounds must be in 0..=23, got {start}..{end}")]
    InvalidOffHours { start: u8, end: u8 },

    #[error("pipeline.workers must be at least 1")]
    NoWorkers,

    #[error("the trusted_list location policy requires at least one trusted location")]
    EmptyTrustedLocations,

    #[error(
        "risk level thresholds must ascend within [0, 1]: \
         low {low}, medium {medium}, high {high}, critical {critical}"
    )]
    InvalidRiskLevels {
        low: f64,
        medium: f64,
        high: f64,
        critical: f64,
    },
}

/// Failure of the parallel batch path itself (not of an individual record).
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("batch worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),

    #[error("batch worker pool closed: {0}")]
    PoolClosed(#[from] tokio::sync::AcquireError),
}
