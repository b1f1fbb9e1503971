//! Record parsing: normalizes every supported input shape into a
//! [`ParsedRecord`].
//!
//! Supported shapes are a flat JSON object, a JSON object whose `data` field
//! holds the transaction as an embedded JSON string (or nested object), and
//! CSV documents with a header row naming the columns.

use crate::error::MalformedInputError;
use crate::types::transaction::{normalize_text, ParsedRecord, TransactionRecord};
use csv::{ReaderBuilder, Trim};
use serde_json::{Map, Value};
use std::io::Read;

/// Field holding the embedded transaction in the legacy request shape
const NESTED_FIELD: &str = "data";
/// Field holding the record list in a batch request body
const BATCH_FIELD: &str = "transactions";

/// Per-record parse outcomes, in input order
pub type ParsedBatch = Vec<Result<ParsedRecord, MalformedInputError>>;

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Parse a JSON document holding one transaction.
pub fn parse_str(input: &str) -> Result<ParsedRecord, MalformedInputError> {
    let value: Value = serde_json::from_str(input)?;
    parse_value(&value)
}

/// Parse one transaction, unwrapping the `data` field when present.
pub fn parse_value(value: &Value) -> Result<ParsedRecord, MalformedInputError> {
    let object = value
        .as_object()
        .ok_or_else(|| MalformedInputError::NotAnObject(kind(value)))?;

    match object.get(NESTED_FIELD) {
        None => parse_object(object),
        Some(Value::String(embedded)) => {
            let inner: Value = serde_json::from_str(embedded).map_err(|e| {
                MalformedInputError::invalid_field(NESTED_FIELD, format!("invalid JSON: {e}"))
            })?;
            match inner {
                Value::Object(inner) => parse_object(&inner),
                other => Err(MalformedInputError::invalid_field(
                    NESTED_FIELD,
                    format!("expected an embedded JSON object, found {}", kind(&other)),
                )),
            }
        }
        Some(Value::Object(inner)) => parse_object(inner),
        Some(other) => Err(MalformedInputError::invalid_field(
            NESTED_FIELD,
            format!("expected a JSON string or object, found {}", kind(other)),
        )),
    }
}

/// Parse a flat JSON object of transaction fields.
pub fn parse_object(object: &Map<String, Value>) -> Result<ParsedRecord, MalformedInputError> {
    let amount = parse_amount(object.get("amount"))?;
    let mut record = TransactionRecord::new(amount)?;

    if let Some(merchant) = text_field(object, "merchant")? {
        record = record.with_merchant(&merchant);
    }
    if let Some(location) = text_field(object, "location")? {
        record = record.with_location(&location);
    }
    if let Some(card_type) = text_field(object, "card_type")? {
        record = record.with_card_type(&card_type);
    }
    if let Some(hour) = parse_time(object.get("time"))? {
        record = record.with_hour(hour)?;
    }

    Ok(ParsedRecord {
        record,
        original_data: object.clone(),
    })
}

fn parse_amount(value: Option<&Value>) -> Result<f64, MalformedInputError> {
    match value {
        None | Some(Value::Null) => Err(MalformedInputError::MissingField("amount")),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| MalformedInputError::invalid_field("amount", "not representable as f64")),
        Some(Value::String(s)) if s.trim().is_empty() => {
            Err(MalformedInputError::MissingField("amount"))
        }
        Some(Value::String(s)) => s.trim().parse::<f64>().map_err(|_| {
            MalformedInputError::invalid_field("amount", format!("`{s}` is not a number"))
        }),
        Some(other) => Err(MalformedInputError::invalid_field(
            "amount",
            format!("expected a number, found {}", kind(other)),
        )),
    }
}

fn text_field(
    object: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<String>, MalformedInputError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(normalize_text(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(MalformedInputError::invalid_field(
            field,
            format!("expected text, found {}", kind(other)),
        )),
    }
}

/// Hour of day from an integer or an `HH`, `HH:MM` or `HH:MM:SS` string.
fn parse_time(value: Option<&Value>) -> Result<Option<u8>, MalformedInputError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .filter(|h| *h <= 23)
            .map(|h| Some(h as u8))
            .ok_or_else(|| {
                MalformedInputError::invalid_field("time", format!("{n} is not an hour in 0..=23"))
            }),
        Some(Value::String(s)) => parse_clock(s),
        Some(other) => Err(MalformedInputError::invalid_field(
            "time",
            format!("expected an hour or HH:MM, found {}", kind(other)),
        )),
    }
}

fn parse_clock(input: &str) -> Result<Option<u8>, MalformedInputError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let invalid = || MalformedInputError::invalid_field("time", format!("`{input}` is not HH:MM"));

    let parts: Vec<&str> = trimmed.split(':').collect();
    if parts.len() > 3
        || parts
            .iter()
            .any(|p| p.is_empty() || p.len() > 2 || !p.bytes().all(|b| b.is_ascii_digit()))
    {
        return Err(invalid());
    }

    let hour: u8 = parts[0].parse().map_err(|_| invalid())?;
    if hour > 23 {
        return Err(invalid());
    }
    for part in &parts[1..] {
        let value: u8 = part.parse().map_err(|_| invalid())?;
        if value > 59 {
            return Err(invalid());
        }
    }

    Ok(Some(hour))
}

/// Parse a batch body: a JSON array of transactions or an object with a
/// `transactions` array. Element failures are kept per record.
pub fn parse_json_batch(value: &Value) -> Result<ParsedBatch, MalformedInputError> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(object) => match object.get(BATCH_FIELD) {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(MalformedInputError::invalid_field(
                    BATCH_FIELD,
                    format!("expected an array, found {}", kind(other)),
                ))
            }
            None => return Err(MalformedInputError::MissingField(BATCH_FIELD)),
        },
        other => return Err(MalformedInputError::NotAnObject(kind(other))),
    };

    Ok(items.iter().map(parse_value).collect())
}

/// Parse a CSV document whose header names the columns.
///
/// Header names are matched case-insensitively; unknown columns are kept in
/// `original_data`. Header failures reject the whole document (reported as
/// row 0); data row failures are kept per record with their 1-based row.
pub fn parse_csv<R: Read>(reader: R) -> Result<ParsedBatch, MalformedInputError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| MalformedInputError::InvalidCsv {
            row: 0,
            reason: e.to_string(),
        })?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    if !headers.iter().any(|h| h == "amount") {
        return Err(MalformedInputError::InvalidCsv {
            row: 0,
            reason: "header has no `amount` column".to_string(),
        });
    }

    let parsed: ParsedBatch = reader
        .records()
        .enumerate()
        .map(|(index, row)| {
            let row = row.map_err(|e| MalformedInputError::InvalidCsv {
                row: index + 1,
                reason: e.to_string(),
            })?;
            let object: Map<String, Value> = headers
                .iter()
                .zip(row.iter())
                .map(|(header, field)| (header.clone(), Value::String(field.to_string())))
                .collect();
            parse_object(&object)
        })
        .collect();

    Ok(parsed)
}
