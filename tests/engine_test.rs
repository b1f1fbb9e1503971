use fraud_scoring_engine::config::{AppConfig, LocationPolicy, RiskWeights};
use fraud_scoring_engine::feature_extractor::FeatureExtractor;
use fraud_scoring_engine::models::{Classifier, RiskScorer};
use fraud_scoring_engine::parser;
use fraud_scoring_engine::types::prediction::RiskLevelThresholds;
use fraud_scoring_engine::{
    BatchCoordinator, FraudEngine, MalformedInputError, Prediction, TransactionRecord,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};
use std::io::Write;
use std::sync::Arc;

const MERCHANTS: [&str; 6] = [
    "Online Store",
    "ATM Cash Advance",
    "Grocery Mart",
    "Crypto Exchange",
    "Cafe Luna",
    "",
];
const LOCATIONS: [&str; 5] = ["New York", "Unknown", "Offshore Bank", "London", ""];

fn random_transaction(rng: &mut StdRng) -> Value {
    let mut tx = json!({
        "amount": (rng.gen_range(0.0..8000.0_f64) * 100.0).round() / 100.0,
        "merchant": MERCHANTS[rng.gen_range(0..MERCHANTS.len())],
        "location": LOCATIONS[rng.gen_range(0..LOCATIONS.len())],
    });
    if rng.gen_bool(0.8) {
        tx["time"] = json!(format!("{:02}:{:02}", rng.gen_range(0..24), rng.gen_range(0..60)));
    }
    tx
}

fn default_engine() -> Arc<FraudEngine> {
    Arc::new(FraudEngine::new(&AppConfig::default()).unwrap())
}

#[test]
fn test_documented_examples() {
    let engine = default_engine();

    let legit = engine
        .evaluate_single(&json!({
            "amount": 1500.00,
            "merchant": "Online Store",
            "location": "New York",
            "time": "14:30",
            "card_type": "credit"
        }))
        .unwrap();
    assert_eq!(legit.prediction, Prediction::Legitimate);
    assert!((legit.risk_score - 0.3).abs() < 1e-9);
    assert!((legit.confidence - 0.7).abs() < 1e-9);

    let fraud = engine
        .evaluate_single(&json!({
            "data": "{\"amount\": 50, \"merchant\": \"ATM Cash Advance\", \"location\": \"Unknown\", \"time\": \"02:15\"}"
        }))
        .unwrap();
    assert_eq!(fraud.prediction, Prediction::Fraud);
    assert!(fraud.risk_score >= 0.5);
}

#[test]
fn test_scores_and_confidence_stay_in_unit_range() {
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..50 {
        let mut config = AppConfig::default();
        // random weight table that still passes validation
        let raw: [f64; 4] = [rng.gen(), rng.gen(), rng.gen(), rng.gen()];
        let scale = rng.gen_range(0.1..1.0) / raw.iter().sum::<f64>();
        config.weights = RiskWeights {
            high_amount: raw[0] * scale,
            unusual_time: raw[1] * scale,
            suspicious_merchant: raw[2] * scale,
            high_risk_location: raw[3] * scale,
        };
        config.detection.fraud_threshold = rng.gen_range(0.0..=1.0);
        let engine = FraudEngine::new(&config).unwrap();

        for _ in 0..40 {
            let result = engine.evaluate_single(&random_transaction(&mut rng)).unwrap();
            assert!((0.0..=1.0).contains(&result.risk_score));
            assert!((0.0..=1.0).contains(&result.confidence));
            assert_eq!(
                result.prediction.is_fraud(),
                result.risk_score > config.detection.fraud_threshold
            );
        }
    }
}

#[test]
fn test_overweighted_scorer_still_clamps() {
    let scorer = RiskScorer::new(RiskWeights {
        high_amount: 5.0,
        unusual_time: 5.0,
        suspicious_merchant: 5.0,
        high_risk_location: 5.0,
    });
    let record = TransactionRecord::new(9000.0)
        .unwrap()
        .with_merchant("casino")
        .with_location("offshore")
        .with_hour(3)
        .unwrap();
    let features = FeatureExtractor::default().extract(&record);

    assert_eq!(scorer.score(&features), 1.0);
}

#[test]
fn test_classification_is_monotonic_for_any_threshold() {
    let mut rng = StdRng::seed_from_u64(11);

    for _ in 0..20 {
        let classifier = Classifier::new(rng.gen_range(0.0..=1.0), RiskLevelThresholds::default());
        let mut scores: Vec<f64> = (0..200).map(|_| rng.gen_range(0.0..=1.0)).collect();
        scores.sort_by(|a, b| a.total_cmp(b));

        let labels: Vec<bool> = scores
            .iter()
            .map(|&s| classifier.classify(s).prediction.is_fraud())
            .collect();
        assert!(labels.windows(2).all(|w| !(w[0] && !w[1])));

        assert_eq!(
            classifier.classify(classifier.threshold()).prediction,
            Prediction::Legitimate
        );
    }
}

#[test]
fn test_extraction_and_scoring_are_pure() {
    let engine = default_engine();
    let mut rng = StdRng::seed_from_u64(3);

    for _ in 0..100 {
        let tx = random_transaction(&mut rng);
        let first = engine.evaluate_single(&tx).unwrap();
        let second = engine.evaluate_single(&tx).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.risk_score.to_bits(), second.risk_score.to_bits());
    }
}

#[tokio::test]
async fn test_batch_order_and_counts_with_rejections() {
    let coordinator = BatchCoordinator::new(default_engine(), 8);
    let mut rng = StdRng::seed_from_u64(42);

    let transactions: Vec<Value> = (0..250)
        .map(|i| {
            if i % 17 == 0 {
                json!({"amount": "n/a", "merchant": "Shop"})
            } else {
                random_transaction(&mut rng)
            }
        })
        .collect();
    let body = json!({ "transactions": transactions });
    let records = parser::parse_json_batch(&body).unwrap();

    let sequential = coordinator.evaluate_batch(records.clone(), None);
    let parallel = coordinator
        .evaluate_batch_parallel(records, None)
        .await
        .unwrap();
    assert_eq!(sequential, parallel);

    let ids: Vec<usize> = parallel.results.iter().map(|e| e.transaction_id).collect();
    assert_eq!(ids, (1..=250).collect::<Vec<_>>());

    let summary = &parallel.summary;
    assert_eq!(summary.total_transactions, 250);
    assert_eq!(summary.parse_errors, 15);
    assert_eq!(
        summary.fraud_detected + summary.legitimate_transactions,
        summary.total_transactions - summary.parse_errors
    );

    for entry in &parallel.results {
        if (entry.transaction_id - 1) % 17 == 0 {
            assert_eq!(entry.outcome.error().unwrap().field.as_deref(), Some("amount"));
        } else {
            assert!(entry.outcome.result().is_some());
        }
    }
}

#[test]
fn test_csv_file_batch() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "amount,merchant,location,time,card_type,reference").unwrap();
    writeln!(file, "1500.00,Online Store,New York,14:30,credit,tx_1").unwrap();
    writeln!(file, "-20,Refund Desk,London,10:00,debit,tx_2").unwrap();
    writeln!(file, "50,ATM Cash Advance,Unknown,02:15,,tx_3").unwrap();
    writeln!(file, "75,Cafe Luna,Paris,25:00,debit,tx_4").unwrap();

    let coordinator = BatchCoordinator::new(default_engine(), 2);
    let reader = std::fs::File::open(file.path()).unwrap();
    let result = coordinator
        .evaluate_csv_batch(reader, Some("transactions.csv".to_string()))
        .unwrap();

    let summary = &result.summary;
    assert_eq!(summary.total_transactions, 4);
    assert_eq!(summary.parse_errors, 2);
    assert_eq!(summary.fraud_detected, 1);
    assert_eq!(summary.legitimate_transactions, 1);
    assert_eq!(summary.fraud_percentage, 25.0);
    assert_eq!(summary.filename.as_deref(), Some("transactions.csv"));

    assert_eq!(result.results[1].outcome.error().unwrap().field.as_deref(), Some("amount"));
    assert_eq!(result.results[3].outcome.error().unwrap().field.as_deref(), Some("time"));

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["results"][0]["original_data"]["reference"], "tx_1");
    assert_eq!(json["results"][2]["prediction"], "fraud");
}

#[test]
fn test_config_file_drives_engine() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
[detection]
fraud_threshold = 0.15

[features]
location_policy = "trusted_list"
trusted_locations = ["new york"]
"#
    )
    .unwrap();

    let config = AppConfig::load_from_path(file.path()).unwrap();
    assert_eq!(config.features.location_policy, LocationPolicy::TrustedList);
    let engine = FraudEngine::new(&config).unwrap();

    let home = engine
        .evaluate_single(&json!({"amount": 10, "location": "New York"}))
        .unwrap();
    assert_eq!(home.prediction, Prediction::Legitimate);

    let abroad = engine
        .evaluate_single(&json!({"amount": 10, "location": "Lisbon"}))
        .unwrap();
    assert!(abroad.features.high_risk_location);
    assert_eq!(abroad.prediction, Prediction::Fraud);
}

#[test]
fn test_single_record_errors_name_the_field() {
    let engine = default_engine();

    assert_eq!(
        engine.evaluate_single(&json!({"merchant": "Shop"})).unwrap_err(),
        MalformedInputError::MissingField("amount")
    );
    let err = engine
        .evaluate_single(&json!({"amount": 5, "time": "half past"}))
        .unwrap_err();
    assert_eq!(err.field(), Some("time"));
}
