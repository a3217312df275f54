//! Cell values of a record set.
//!
//! Records are loosely typed: any column may hold text, numbers, booleans,
//! calendar dates or date-times. Date-times are reduced to calendar dates
//! before any comparison, so a treatment logged at 14:30 and one logged at
//! midnight on the same day mark the same grid cell.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cell of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing value.
    Null,
    /// Boolean flag.
    Bool(bool),
    /// Integer (ids, counts).
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Calendar date.
    Date(NaiveDate),
    /// Date with time of day; truncated to its date when read as a date.
    DateTime(NaiveDateTime),
    /// Free text (codes, categories, labels).
    Text(String),
}

impl Value {
    /// Whether this value is missing.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Calendar date of this value, if it is date-valued.
    ///
    /// `DateTime` values lose their time of day.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            Value::DateTime(dt) => Some(dt.date()),
            _ => None,
        }
    }

    /// Whether this value equals a filter literal from a specification.
    ///
    /// Specification filter values are always strings; they are compared
    /// against the value's own type so that `"1"` matches `Int(1)` and
    /// `"2016-12-18"` matches the corresponding date.
    pub fn matches_literal(&self, literal: &str) -> bool {
        match self {
            Value::Null => false,
            Value::Text(s) => s == literal,
            Value::Bool(b) => literal.parse::<bool>().map_or(false, |l| l == *b),
            Value::Int(i) => literal.trim().parse::<i64>().map_or(false, |l| l == *i),
            Value::Float(f) => literal.trim().parse::<f64>().map_or(false, |l| l == *f),
            Value::Date(_) | Value::DateTime(_) => {
                parse_date_text(literal).map_or(false, |d| Some(d) == self.as_date())
            }
        }
    }

    /// Normalizes a date-time to its calendar date; other values are unchanged.
    pub fn truncated(self) -> Self {
        match self {
            Value::DateTime(dt) => Value::Date(dt.date()),
            other => other,
        }
    }

    /// Converts a JSON scalar into a value.
    ///
    /// With `as_date` set, strings are parsed as dates or date-times and kept
    /// as text only when they do not parse.
    pub fn from_json(json: &serde_json::Value, as_date: bool) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map_or(Value::Null, Value::Float),
            },
            serde_json::Value::String(s) if as_date => parse_date_value(s),
            serde_json::Value::String(s) => Value::Text(s.clone()),
            other => Value::Text(other.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Date(d) => write!(f, "{d}"),
            Value::DateTime(dt) => write!(f, "{dt}"),
            Value::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y,%m,%d", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parses a date literal in any of the accepted date or date-time formats.
pub(crate) fn parse_date_text(input: &str) -> Option<NaiveDate> {
    parse_date_value(input).as_date()
}

fn parse_date_value(input: &str) -> Value {
    let s = input.trim();
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Value::Date(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Value::DateTime(dt);
        }
    }
    // RFC 3339 with offset: keep the local wall-clock date.
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Value::DateTime(dt.naive_local());
    }
    Value::Text(input.to_string())
}
