//! Batch evaluation: runs the scoring pipeline over an ordered sequence of
//! records and summarizes the outcome.
//!
//! `transaction_id` is the 1-based position in the input, assigned before any
//! work is dispatched, so rejected records keep their slot and the parallel
//! path returns exactly what the sequential one does.

use crate::error::{BatchError, MalformedInputError};
use crate::metrics::BatchMetrics;
use crate::models::engine::FraudEngine;
use crate::parser::{self, ParsedBatch};
use crate::types::batch::{BatchEntry, BatchOutcome, BatchResult, BatchSummary};
use crate::types::transaction::ParsedRecord;
use serde_json::Value;
use std::io::Read;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Applies a shared [`FraudEngine`] to whole batches
#[derive(Clone)]
pub struct BatchCoordinator {
    engine: Arc<FraudEngine>,
    workers: usize,
    metrics: Option<Arc<BatchMetrics>>,
}

impl BatchCoordinator {
    /// Create a coordinator; `workers` bounds the parallel path
    pub fn new(engine: Arc<FraudEngine>, workers: usize) -> Self {
        Self {
            engine,
            workers: workers.max(1),
            metrics: None,
        }
    }

    /// Record per-record timings and outcomes into `metrics`
    pub fn with_metrics(mut self, metrics: Arc<BatchMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn engine(&self) -> &FraudEngine {
        &self.engine
    }

    /// Evaluate records one after another, in input order
    pub fn evaluate_batch(&self, records: ParsedBatch, filename: Option<String>) -> BatchResult {
        let batch_id = Uuid::new_v4();
        debug!(%batch_id, records = records.len(), "Evaluating batch");

        let entries = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                evaluate_one(&self.engine, self.metrics.as_deref(), index + 1, record)
            })
            .collect();

        finish(batch_id, entries, filename)
    }

    /// Evaluate records on up to `workers` concurrent tasks.
    ///
    /// Produces the same entries, in the same order, as [`Self::evaluate_batch`].
    pub async fn evaluate_batch_parallel(
        &self,
        records: ParsedBatch,
        filename: Option<String>,
    ) -> Result<BatchResult, BatchError> {
        let batch_id = Uuid::new_v4();
        debug!(
            %batch_id,
            records = records.len(),
            workers = self.workers,
            "Evaluating batch in parallel"
        );

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut handles = Vec::with_capacity(records.len());

        for (index, record) in records.into_iter().enumerate() {
            let permit = semaphore.clone().acquire_owned().await?;
            let engine = self.engine.clone();
            let metrics = self.metrics.clone();

            handles.push(tokio::spawn(async move {
                let entry = evaluate_one(&engine, metrics.as_deref(), index + 1, record);
                drop(permit);
                entry
            }));
        }

        let mut entries = futures::future::join_all(handles)
            .await
            .into_iter()
            .collect::<Result<Vec<BatchEntry>, _>>()?;
        entries.sort_by_key(|entry| entry.transaction_id);

        Ok(finish(batch_id, entries, filename))
    }

    /// Parse and evaluate a JSON batch body (array or `{"transactions": [...]}`)
    pub fn evaluate_json_batch(
        &self,
        body: &Value,
        filename: Option<String>,
    ) -> Result<BatchResult, MalformedInputError> {
        let records = parser::parse_json_batch(body)?;
        Ok(self.evaluate_batch(records, filename))
    }

    /// Parse and evaluate a CSV document with a header row
    pub fn evaluate_csv_batch<R: Read>(
        &self,
        reader: R,
        filename: Option<String>,
    ) -> Result<BatchResult, MalformedInputError> {
        let records = parser::parse_csv(reader)?;
        Ok(self.evaluate_batch(records, filename))
    }
}

fn evaluate_one(
    engine: &FraudEngine,
    metrics: Option<&BatchMetrics>,
    transaction_id: usize,
    record: Result<ParsedRecord, MalformedInputError>,
) -> BatchEntry {
    let start_time = Instant::now();

    let outcome = match record {
        Ok(parsed) => {
            let result = engine.evaluate_record(&parsed.record);
            if let Some(metrics) = metrics {
                metrics.record_prediction(start_time.elapsed(), &result);
            }
            debug!(
                transaction_id,
                prediction = %result.prediction,
                risk_score = result.risk_score,
                "Batch record scored"
            );
            BatchOutcome::Scored {
                result,
                original_data: parsed.original_data,
            }
        }
        Err(err) => {
            if let Some(metrics) = metrics {
                metrics.record_parse_error();
            }
            warn!(transaction_id, error = %err, "Batch record rejected");
            BatchOutcome::Rejected(err.into())
        }
    };

    BatchEntry {
        transaction_id,
        outcome,
    }
}

fn finish(batch_id: Uuid, entries: Vec<BatchEntry>, filename: Option<String>) -> BatchResult {
    let summary = BatchSummary::from_entries(&entries, filename);

    info!(
        %batch_id,
        total = summary.total_transactions,
        fraud = summary.fraud_detected,
        legitimate = summary.legitimate_transactions,
        parse_errors = summary.parse_errors,
        fraud_percentage = summary.fraud_percentage,
        filename = summary.filename.as_deref().unwrap_or("-"),
        "Batch evaluated"
    );

    BatchResult {
        results: entries,
        summary,
    }
}
