//! Scoring model components

pub mod classifier;
pub mod engine;
pub mod scorer;

pub use classifier::{Classification, Classifier};
pub use engine::{FraudEngine, ModelInfo};
pub use scorer::{RiskContribution, RiskFactor, RiskScorer};
