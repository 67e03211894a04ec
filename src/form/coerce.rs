//! Typed coercion of submitted strings.

use crate::model::ValueType;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde_json::{Number, Value};
use std::str::FromStr;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Storage format for datetimes; the fraction is omitted when zero.
pub const DATETIME_STORAGE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Coerce a raw string. `Ok(None)` means "no value submitted".
/// Strings are kept verbatim; other types are parsed from the trimmed text.
pub fn coerce(value_type: ValueType, submitted: &str) -> Result<Option<Value>, String> {
    let raw = submitted.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    match value_type {
        ValueType::String => Ok(Some(Value::String(submitted.to_string()))),
        ValueType::Int => raw
            .parse::<i64>()
            .map(|n| Some(Value::Number(n.into())))
            .map_err(|_| "Not a valid integer value.".to_string()),
        ValueType::Float => raw
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(|n| Some(Value::Number(n)))
            .ok_or_else(|| "Not a valid float value.".to_string()),
        ValueType::Decimal => Decimal::from_str(raw)
            .map(|d| Some(Value::String(d.normalize().to_string())))
            .map_err(|_| "Not a valid decimal value.".to_string()),
        ValueType::Bool => match raw {
            "True" | "true" | "1" | "on" | "yes" => Ok(Some(Value::Bool(true))),
            "False" | "false" | "0" | "off" | "no" => Ok(Some(Value::Bool(false))),
            "None" | "none" => Ok(None),
            _ => Err("Not a valid choice.".to_string()),
        },
        ValueType::Date => NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .map(|d| Some(Value::String(d.format(DATE_FORMAT).to_string())))
            .map_err(|_| "Not a valid date value.".to_string()),
        ValueType::DateTime => DATETIME_FORMATS
            .iter()
            .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
            .map(|d| Some(Value::String(d.format(DATETIME_STORAGE_FORMAT).to_string())))
            .ok_or_else(|| "Not a valid datetime value.".to_string()),
    }
}
