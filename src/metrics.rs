//! Processing metrics for batch evaluation runs.

use crate::types::prediction::PredictionResult;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector shared by batch workers
pub struct BatchMetrics {
    /// Records that reached the classifier
    pub transactions_processed: AtomicU64,
    /// Records labelled fraud
    pub fraud_detected: AtomicU64,
    /// Records rejected by the parser
    pub parse_errors: AtomicU64,
    /// Predictions by risk level
    predictions_by_level: RwLock<HashMap<String, u64>>,
    /// Processing times (in microseconds)
    processing_times: RwLock<Vec<u64>>,
    /// Risk score distribution buckets
    score_buckets: RwLock<[u64; 10]>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl BatchMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            transactions_processed: AtomicU64::new(0),
            fraud_detected: AtomicU64::new(0),
            parse_errors: AtomicU64::new(0),
            predictions_by_level: RwLock::new(HashMap::new()),
            processing_times: RwLock::new(Vec::with_capacity(1000)),
            score_buckets: RwLock::new([0; 10]),
            start_time: Instant::now(),
        }
    }

    /// Record a scored transaction
    pub fn record_prediction(&self, processing_time: Duration, result: &PredictionResult) {
        self.transactions_processed.fetch_add(1, Ordering::Relaxed);
        if result.prediction.is_fraud() {
            self.fraud_detected.fetch_add(1, Ordering::Relaxed);
        }

        if let Ok(mut times) = self.processing_times.write() {
            times.push(processing_time.as_micros() as u64);
            // Keep only last 10000
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }

        let bucket = (result.risk_score * 10.0).clamp(0.0, 9.0) as usize;
        if let Ok(mut buckets) = self.score_buckets.write() {
            buckets[bucket] += 1;
        }

        if let Ok(mut by_level) = self.predictions_by_level.write() {
            let level = format!("{:?}", result.risk_level).to_lowercase();
            *by_level.entry(level).or_insert(0) += 1;
        }
    }

    /// Record a record the parser rejected
    pub fn record_parse_error(&self) {
        self.parse_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get processing time statistics
    pub fn get_processing_stats(&self) -> ProcessingStats {
        let mut sorted: Vec<u64> = match self.processing_times.read() {
            Ok(times) if !times.is_empty() => times.clone(),
            _ => return ProcessingStats::default(),
        };
        sorted.sort_unstable();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        ProcessingStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[(count as f64 * 0.95) as usize],
            p99_us: sorted[(count as f64 * 0.99) as usize],
            max_us: *sorted.last().unwrap_or(&0),
        }
    }

    /// Get current throughput (transactions per second)
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.transactions_processed.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Get score distribution
    pub fn get_score_distribution(&self) -> [u64; 10] {
        self.score_buckets.read().map(|b| *b).unwrap_or([0; 10])
    }

    /// Get predictions by risk level
    pub fn get_predictions_by_level(&self) -> HashMap<String, u64> {
        self.predictions_by_level
            .read()
            .map(|by_level| by_level.clone())
            .unwrap_or_default()
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let tx_count = self.transactions_processed.load(Ordering::Relaxed);
        let fraud_count = self.fraud_detected.load(Ordering::Relaxed);
        let error_count = self.parse_errors.load(Ordering::Relaxed);
        let fraud_rate = if tx_count > 0 {
            (fraud_count as f64 / tx_count as f64) * 100.0
        } else {
            0.0
        };

        let processing = self.get_processing_stats();
        let throughput = self.get_throughput();
        let by_level = self.get_predictions_by_level();
        let score_dist = self.get_score_distribution();

        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║              FRAUD SCORING ENGINE - BATCH SUMMARY            ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Transactions Scored:    {:>8}  │  Throughput: {:>6.1} tx/s ║",
            tx_count, throughput
        );
        info!(
            "║ Fraud Detected:         {:>8}  │  Fraud Rate: {:>6.1}%     ║",
            fraud_count, fraud_rate
        );
        info!("║ Rejected Records:       {:>8}                             ║", error_count);
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Processing Time (μs): mean={:>5} p50={:>5} p95={:>5} p99={:>5} ║",
            processing.mean_us, processing.p50_us, processing.p95_us, processing.p99_us
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Predictions by Risk Level:                                   ║");
        for (level, count) in &by_level {
            let pct = if tx_count > 0 {
                (*count as f64 / tx_count as f64) * 100.0
            } else {
                0.0
            };
            info!("║   {:10}: {:>6} ({:>5.1}%)                                ║", level, count, pct);
        }
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Risk Score Distribution:                                     ║");
        let total: u64 = score_dist.iter().sum();
        for (i, &count) in score_dist.iter().enumerate() {
            let pct = if total > 0 { (count as f64 / total as f64) * 100.0 } else { 0.0 };
            let bar: String = "█".repeat(((pct / 2.0) as usize).min(20));
            info!(
                "║   {:.1}-{:.1}: {:>6} ({:>5.1}%) {}",
                i as f64 / 10.0,
                (i + 1) as f64 / 10.0,
                count,
                pct,
                bar
            );
        }
        info!("╚══════════════════════════════════════════════════════════════╝");
    }
}

impl Default for BatchMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Processing time statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::models::engine::FraudEngine;
    use crate::types::transaction::TransactionRecord;

    fn scored(amount: f64, merchant: &str, hour: u8) -> PredictionResult {
        let engine = FraudEngine::new(&AppConfig::default()).unwrap();
        let record = TransactionRecord::new(amount)
            .unwrap()
            .with_merchant(merchant)
            .with_hour(hour)
            .unwrap();
        engine.evaluate_record(&record)
    }

    #[test]
    fn test_metrics_recording() {
        let metrics = BatchMetrics::new();

        metrics.record_prediction(Duration::from_micros(100), &scored(20.0, "grocer", 12));
        metrics.record_prediction(Duration::from_micros(300), &scored(5000.0, "casino", 2));
        metrics.record_parse_error();

        assert_eq!(metrics.transactions_processed.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.fraud_detected.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.parse_errors.load(Ordering::Relaxed), 1);

        let stats = metrics.get_processing_stats();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.mean_us, 200);
        assert_eq!(stats.max_us, 300);
    }

    #[test]
    fn test_score_distribution() {
        let metrics = BatchMetrics::new();
        metrics.record_prediction(Duration::from_micros(1), &scored(20.0, "grocer", 12));
        metrics.record_prediction(Duration::from_micros(1), &scored(5000.0, "casino", 2));

        let dist = metrics.get_score_distribution();
        assert_eq!(dist[0], 1);
        // a score of 0.8 can land in bucket 7 or 8 depending on rounding
        assert_eq!(dist[7] + dist[8], 1);
        assert_eq!(dist.iter().sum::<u64>(), 2);

        let by_level = metrics.get_predictions_by_level();
        assert_eq!(by_level.get("low"), Some(&1));
    }

    #[test]
    fn test_empty_stats() {
        let metrics = BatchMetrics::new();
        assert_eq!(metrics.get_processing_stats().count, 0);
        assert_eq!(metrics.get_score_distribution(), [0; 10]);
    }
}
