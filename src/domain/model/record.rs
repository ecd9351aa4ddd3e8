use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::model::FieldKind;

/// Identifier assigned by the record store on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        RecordId(value)
    }
}

impl From<RecordId> for i64 {
    fn from(value: RecordId) -> Self {
        value.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(RecordId)
            .map_err(|_| format!("invalid record id '{}'", s))
    }
}

/// A typed scalar field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Number(i64),
    Date(NaiveDate),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            FieldValue::Text(s) => JsonValue::from(s.as_str()),
            FieldValue::Number(n) => JsonValue::from(*n),
            FieldValue::Date(d) => JsonValue::from(d.format("%Y-%m-%d").to_string()),
        }
    }

    /// Decodes a wire value for a field of the given kind.
    ///
    /// Numbers and strings are accepted interchangeably where the meaning is
    /// unambiguous (`"7"` for a reference, `7` for text).
    pub fn from_json(kind: FieldKind, v: &JsonValue) -> Result<FieldValue, String> {
        match kind {
            FieldKind::Text | FieldKind::Email | FieldKind::Choice(_) => {
                if let Some(s) = v.as_str() {
                    return Ok(FieldValue::Text(s.to_string()));
                }
                if v.is_number() || v.is_boolean() {
                    return Ok(FieldValue::Text(v.to_string()));
                }
                Err("expected string".to_string())
            }
            FieldKind::Date => {
                let s = v.as_str().ok_or_else(|| "expected date string".to_string())?;
                // Stores sometimes hand back full timestamps; keep the date part.
                let day = s.get(..10).unwrap_or(s);
                NaiveDate::parse_from_str(day, "%Y-%m-%d")
                    .map(FieldValue::Date)
                    .map_err(|_| format!("expected YYYY-MM-DD date, got '{}'", s))
            }
            FieldKind::Reference(_) => {
                if let Some(n) = v.as_i64() {
                    return Ok(FieldValue::Number(n));
                }
                if let Some(s) = v.as_str() {
                    return s
                        .trim()
                        .parse::<i64>()
                        .map(FieldValue::Number)
                        .map_err(|_| format!("expected record id, got '{}'", s));
                }
                // Lookups may come back expanded as `{ "Id": .., "Name": .. }`.
                if let Some(n) = v.get("Id").and_then(JsonValue::as_i64) {
                    return Ok(FieldValue::Number(n));
                }
                Err("expected record id".to_string())
            }
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

/// Field name (canonical) to value.
pub type Fields = BTreeMap<String, FieldValue>;

/// A persisted record in canonical shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: RecordId,
    pub fields: Fields,
}

impl Record {
    pub fn new(id: RecordId, fields: Fields) -> Self {
        Self { id, fields }
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(FieldValue::as_text)
    }
}

/// Unsaved user input: raw strings keyed by canonical field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub values: BTreeMap<String, String>,
}

impl Draft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: &str, value: impl Into<String>) -> Self {
        self.values.insert(field.to_string(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    /// Pre-fills an edit form from a persisted record.
    pub fn from_record(record: &Record) -> Self {
        Self {
            values: record
                .fields
                .iter()
                .map(|(k, v)| (k.clone(), v.to_string()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Draft {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
