//! Tick parsing for decoded kline documents.
//!
//! A matching data document looks like
//! `{"dataType": "<symbol>@kline_<tf>", "data": [{"T": 0, "o": "", ...}]}`.
//! Each element of `data` becomes one [`Tick`], in array order. Elements
//! that fail validation are dropped on their own; their siblings survive.

use std::borrow::Cow;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::models::candle::Tick;
use crate::subscription::{Subscription, is_ack};

/// Keys every kline element must carry.
const REQUIRED_FIELDS: [&str; 6] = ["T", "o", "h", "l", "c", "v"];

/// Errors raised while parsing a document or one of its elements.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The text is not a JSON document.
    #[error("malformed document: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A kline element is not a JSON object.
    #[error("kline element is not an object")]
    NotAnObject,

    /// A kline element lacks one of the required keys.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    /// A present field does not hold a usable number.
    #[error("invalid numeric field `{field}`: {value}")]
    InvalidNumber { field: &'static str, value: String },

    /// The volume field is negative.
    #[error("negative volume: {0}")]
    NegativeVolume(Decimal),
}

/// Classification of one decoded document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    /// Valid ticks for the subscription, in array order. May be empty if
    /// every element was dropped.
    Ticks(Vec<Tick>),
    /// The feed acknowledged the subscription.
    SubscriptionAck,
    /// A well-formed document that is neither data nor an ack.
    Unrecognized,
}

/// Parses decoded text against `subscription`.
///
/// # Errors
///
/// Returns [`ParseError::Malformed`] if `text` is not JSON. Element-level
/// failures are logged and never returned.
pub fn parse(text: &str, subscription: &Subscription) -> Result<Parsed, ParseError> {
    let document: Value = serde_json::from_str(text)?;

    let data_type = document.get("dataType").and_then(Value::as_str);
    let entries = document
        .get("data")
        .and_then(Value::as_array)
        .filter(|entries| !entries.is_empty());

    if let (Some(data_type), Some(entries)) = (data_type, entries) {
        if subscription.matches(data_type) {
            let ticks = entries
                .iter()
                .filter_map(|entry| match parse_tick(entry) {
                    Ok(tick) => Some(tick),
                    Err(e) => {
                        debug!(error = %e, %entry, "Dropping kline element");
                        None
                    }
                })
                .collect();
            return Ok(Parsed::Ticks(ticks));
        }
    }

    if is_ack(&document) {
        return Ok(Parsed::SubscriptionAck);
    }

    Ok(Parsed::Unrecognized)
}

/// Converts one kline element into a [`Tick`].
///
/// # Errors
///
/// Returns a [`ParseError`] if the element is not an object, lacks a
/// required key, or holds a value that is not a number.
pub fn parse_tick(entry: &Value) -> Result<Tick, ParseError> {
    let fields = entry.as_object().ok_or(ParseError::NotAnObject)?;

    if let Some(missing) = REQUIRED_FIELDS.iter().find(|k| !fields.contains_key(**k)) {
        return Err(ParseError::MissingField(*missing));
    }

    let volume = decimal_field(fields, "v")?;
    if volume < Decimal::ZERO {
        return Err(ParseError::NegativeVolume(volume));
    }

    Ok(Tick {
        bucket_start: millis_field(fields, "T")?,
        open: decimal_field(fields, "o")?,
        high: decimal_field(fields, "h")?,
        low: decimal_field(fields, "l")?,
        close: decimal_field(fields, "c")?,
        volume,
    })
}

/// Reads an epoch-millisecond integer, given as a JSON integer or an
/// integer string.
fn millis_field(fields: &Map<String, Value>, field: &'static str) -> Result<i64, ParseError> {
    let value = &fields[field];
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| invalid(field, value))
}

/// Reads a decimal given as a JSON number or a numeric string.
fn decimal_field(fields: &Map<String, Value>, field: &'static str) -> Result<Decimal, ParseError> {
    let value = &fields[field];
    let raw: Cow<'_, str> = match value {
        Value::String(s) => Cow::Borrowed(s.trim()),
        Value::Number(n) => Cow::Owned(n.to_string()),
        _ => return Err(invalid(field, value)),
    };

    Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .map_err(|_| invalid(field, value))
}

fn invalid(field: &'static str, value: &Value) -> ParseError {
    ParseError::InvalidNumber {
        field,
        value: value.to_string(),
    }
}
