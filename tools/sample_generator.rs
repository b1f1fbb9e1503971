//! Sample Transaction Generator
//!
//! Writes a CSV of random legitimate and suspicious transactions for
//! exercising `fraud-engine batch`.

use anyhow::{ensure, Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "sample-generator", about = "Generate sample transactions as CSV")]
struct Args {
    /// Number of transactions to generate
    #[arg(short = 'n', long, default_value_t = 100)]
    count: u64,

    /// Share of suspicious transactions (0.0 - 1.0)
    #[arg(long, default_value_t = 0.1)]
    fraud_rate: f64,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Output file; stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// CSV row matching the engine's expected columns, plus a pass-through reference
#[derive(Debug, Clone, Serialize)]
struct SampleTransaction {
    amount: String,
    merchant: String,
    location: String,
    time: String,
    card_type: String,
    reference: String,
}

/// Transaction generator for testing
struct TransactionGenerator {
    rng: StdRng,
    transaction_counter: u64,
}

impl TransactionGenerator {
    fn new(seed: Option<u64>) -> Self {
        Self {
            rng: seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64),
            transaction_counter: 0,
        }
    }

    /// Generate a random legitimate transaction
    fn generate_legitimate(&mut self) -> SampleTransaction {
        self.transaction_counter += 1;

        SampleTransaction {
            amount: format!("{:.2}", self.rng.gen_range(5.0..900.0)),
            merchant: self
                .random_choice(&["Grocery Mart", "Shell Gas Station", "Cafe Luna", "Online Store", "Bookshop"])
                .to_string(),
            location: self
                .random_choice(&["New York", "London", "Toronto", "Berlin", "Paris"])
                .to_string(),
            time: format!("{:02}:{:02}", self.rng.gen_range(7..22), self.rng.gen_range(0..60)),
            card_type: self.random_choice(&["credit", "debit"]).to_string(),
            reference: format!("tx_{:08}", self.transaction_counter),
        }
    }

    /// Generate a suspicious transaction
    fn generate_suspicious(&mut self) -> SampleTransaction {
        self.transaction_counter += 1;

        SampleTransaction {
            amount: format!("{:.2}", self.rng.gen_range(1000.0..10000.0)), // High amount
            merchant: self
                .random_choice(&["ATM Cash Advance", "Crypto Exchange", "Casino Royale", "Wire Transfer Co"])
                .to_string(),
            location: self
                .random_choice(&["Unknown", "Offshore", "Russia", "New York"])
                .to_string(),
            time: format!("{:02}:{:02}", self.rng.gen_range(0..6), self.rng.gen_range(0..60)), // Night time
            card_type: self.random_choice(&["prepaid", "gift", "credit"]).to_string(),
            reference: format!("tx_{:08}", self.transaction_counter),
        }
    }

    fn random_choice<'a>(&mut self, choices: &[&'a str]) -> &'a str {
        choices[self.rng.gen_range(0..choices.len())]
    }
}

fn checked_fraud_rate(rate: f64) -> Result<f64> {
    ensure!(rate.is_finite(), "--fraud-rate must be a finite number, got {rate}");
    Ok(rate.clamp(0.0, 1.0))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sample_generator=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let fraud_rate = checked_fraud_rate(args.fraud_rate)?;

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(
            std::fs::File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout()),
    };
    let mut writer = csv::Writer::from_writer(sink);

    let mut generator = TransactionGenerator::new(args.seed);
    let mut legitimate_count = 0;
    let mut suspicious_count = 0;

    for _ in 0..args.count {
        let transaction = if generator.rng.gen_bool(fraud_rate) {
            suspicious_count += 1;
            generator.generate_suspicious()
        } else {
            legitimate_count += 1;
            generator.generate_legitimate()
        };
        writer.serialize(&transaction)?;
    }
    writer.flush()?;

    info!(
        count = args.count,
        legitimate = legitimate_count,
        suspicious = suspicious_count,
        "Sample transactions written"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraud_rate_must_be_finite() {
        assert!(checked_fraud_rate(f64::NAN).is_err());
        assert!(checked_fraud_rate(f64::INFINITY).is_err());
        assert_eq!(checked_fraud_rate(0.25).unwrap(), 0.25);
        assert_eq!(checked_fraud_rate(3.0).unwrap(), 1.0);
        assert_eq!(checked_fraud_rate(-1.0).unwrap(), 0.0);
    }
}
