//! Canonical transaction record consumed by the feature extractor

use crate::error::MalformedInputError;
use serde::Serialize;
use serde_json::{Map, Value};

/// A normalized transaction.
///
/// Text fields are trimmed and lower-cased; empty text is treated as absent.
/// Only `amount` is required. Fields are private so every record goes
/// through the validating constructors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRecord {
    amount: f64,
    merchant: Option<String>,
    location: Option<String>,
    hour: Option<u8>,
    card_type: Option<String>,
}

impl TransactionRecord {
    /// Create a record with the given amount and every optional field absent.
    pub fn new(amount: f64) -> Result<Self, MalformedInputError> {
        if !amount.is_finite() {
            return Err(MalformedInputError::invalid_field(
                "amount",
                format!("{amount} is not a finite number"),
            ));
        }
        if amount < 0.0 {
            return Err(MalformedInputError::invalid_field(
                "amount",
                format!("{amount} is negative"),
            ));
        }

        Ok(Self {
            amount,
            merchant: None,
            location: None,
            hour: None,
            card_type: None,
        })
    }

    pub fn with_merchant(mut self, merchant: &str) -> Self {
        self.merchant = normalize_text(merchant);
        self
    }

    pub fn with_location(mut self, location: &str) -> Self {
        self.location = normalize_text(location);
        self
    }

    pub fn with_card_type(mut self, card_type: &str) -> Self {
        self.card_type = normalize_text(card_type);
        self
    }

    /// Set the hour of day (0..=23).
    pub fn with_hour(mut self, hour: u8) -> Result<Self, MalformedInputError> {
        if hour > 23 {
            return Err(MalformedInputError::invalid_field(
                "time",
                format!("hour {hour} is outside 0..=23"),
            ));
        }
        self.hour = Some(hour);
        Ok(self)
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn merchant(&self) -> Option<&str> {
        self.merchant.as_deref()
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn hour(&self) -> Option<u8> {
        self.hour
    }

    pub fn card_type(&self) -> Option<&str> {
        self.card_type.as_deref()
    }
}

/// A record together with the raw fields it was parsed from.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRecord {
    pub record: TransactionRecord,
    /// Every input field, known or not, for pass-through display
    pub original_data: Map<String, Value>,
}

pub(crate) fn normalize_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_fields_are_normalized() {
        let record = TransactionRecord::new(42.0)
            .unwrap()
            .with_merchant("  ATM Cash Advance ")
            .with_location("New York")
            .with_card_type("   ");

        assert_eq!(record.merchant(), Some("atm cash advance"));
        assert_eq!(record.location(), Some("new york"));
        assert_eq!(record.card_type(), None);
        assert_eq!(record.hour(), None);
    }

    #[test]
    fn test_rejects_invalid_amounts() {
        let err = TransactionRecord::new(-1.0).unwrap_err();
        assert_eq!(err.field(), Some("amount"));
        assert!(TransactionRecord::new(f64::NAN).is_err());
        assert!(TransactionRecord::new(f64::INFINITY).is_err());
        assert!(TransactionRecord::new(0.0).is_ok());
    }

    #[test]
    fn test_rejects_out_of_range_hour() {
        let record = TransactionRecord::new(1.0).unwrap();
        assert_eq!(record.clone().with_hour(23).unwrap().hour(), Some(23));
        let err = record.with_hour(24).unwrap_err();
        assert_eq!(err.field(), Some("time"));
    }
}
