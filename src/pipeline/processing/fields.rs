//! Typed views over raw JSON field values and the explicit coercions the
//! Silver contract applies to them.

use serde_json::{Number, Value};

use crate::domain::RawRecord;

/// The shape of one raw field, as seen at the validation boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    /// Key not present in the record
    Absent,
    Null,
    Bool(bool),
    Number(&'a Number),
    Text(&'a str),
    /// Arrays and objects
    Composite(&'a Value),
}

impl<'a> FieldValue<'a> {
    pub fn of(record: &'a RawRecord, key: &str) -> Self {
        Self::from_value(record.get(key))
    }

    pub fn from_value(value: Option<&'a Value>) -> Self {
        match value {
            None => FieldValue::Absent,
            Some(Value::Null) => FieldValue::Null,
            Some(Value::Bool(b)) => FieldValue::Bool(*b),
            Some(Value::Number(n)) => FieldValue::Number(n),
            Some(Value::String(s)) => FieldValue::Text(s),
            Some(other) => FieldValue::Composite(other),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Absent | FieldValue::Null)
    }

    /// Trimmed text rendering, or `None` when the value is missing or blank.
    ///
    /// Non-string scalars and composites render as compact JSON text.
    pub fn to_text(&self) -> Option<String> {
        let rendered = match self {
            FieldValue::Absent | FieldValue::Null => return None,
            FieldValue::Text(s) => s.trim().to_string(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Composite(v) => v.to_string(),
        };
        if rendered.is_empty() {
            None
        } else {
            Some(rendered)
        }
    }

    /// Finite float from a JSON number or a numeric string.
    pub fn to_float(&self) -> Option<f64> {
        let parsed = match self {
            FieldValue::Number(n) => n.as_f64(),
            FieldValue::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        parsed.filter(|f| f.is_finite())
    }

    /// Truthiness of a present value; `None` when absent or null.
    pub fn to_flag(&self) -> Option<bool> {
        match self {
            FieldValue::Absent | FieldValue::Null => None,
            FieldValue::Bool(b) => Some(*b),
            FieldValue::Number(n) => Some(n.as_f64().map(|f| f != 0.0).unwrap_or(true)),
            FieldValue::Text(s) => Some(!s.is_empty()),
            FieldValue::Composite(Value::Array(items)) => Some(!items.is_empty()),
            FieldValue::Composite(Value::Object(map)) => Some(!map.is_empty()),
            FieldValue::Composite(_) => Some(true),
        }
    }
}

/// Round to `places` decimal places, half to even on the exact binary value.
///
/// Formatting rounds the exact value, so `0.00035` (stored just below the half)
/// goes down where scaling by `10^places` first would push it up.
pub fn round_to(value: f64, places: usize) -> f64 {
    format!("{:.*}", places, value).parse().unwrap_or(value)
}
