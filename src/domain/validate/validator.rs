// Draft validation: runs before anything is sent to the record store.

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::model::{Draft, EntitySchema, FieldKind, FieldValue, Fields};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// One or more required fields are blank. The message stays generic; the
    /// offending fields are kept for callers that want per-field feedback.
    #[error("All fields are required")]
    MissingFields { fields: Vec<String> },

    #[error("Please enter a valid email address")]
    InvalidEmail { field: String },

    #[error("Invalid value '{value}' for {field}")]
    InvalidChoice { field: String, value: String },

    #[error("Invalid date '{value}' for {field} (expected YYYY-MM-DD)")]
    InvalidDate { field: String, value: String },

    #[error("Invalid record reference '{value}' for {field}")]
    InvalidReference { field: String, value: String },

    #[error("{end} must not be before {start}")]
    InvalidDateRange { start: String, end: String },
}

impl ValidationError {
    /// Fields the error refers to.
    pub fn fields(&self) -> Vec<&str> {
        match self {
            ValidationError::MissingFields { fields } => fields.iter().map(String::as_str).collect(),
            ValidationError::InvalidEmail { field }
            | ValidationError::InvalidChoice { field, .. }
            | ValidationError::InvalidDate { field, .. }
            | ValidationError::InvalidReference { field, .. } => vec![field.as_str()],
            ValidationError::InvalidDateRange { start, end } => vec![start.as_str(), end.as_str()],
        }
    }
}

/// A draft that passed validation, in canonical typed form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRecord {
    pub fields: Fields,
    /// Optional fields left blank in the draft. An update erases them from
    /// the stored record; a create ignores them.
    pub cleared: Vec<String>,
}

/// Validates `draft` against `schema` and returns the normalized record.
///
/// Checks run in order: required fields (all at once), then per-field types,
/// then the schema's cross-field rules. Values are trimmed and declared
/// defaults applied. Blank optional fields end up in [`ValidRecord::cleared`].
pub fn validate_draft(
    schema: &dyn EntitySchema,
    draft: &Draft,
) -> Result<ValidRecord, ValidationError> {
    let mut missing = Vec::new();
    for spec in schema.fields().iter().filter(|f| f.required) {
        let blank = draft.get(spec.name).map(str::trim).unwrap_or("").is_empty();
        if blank {
            missing.push(spec.name.to_string());
        }
    }
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields { fields: missing });
    }

    let mut fields = Fields::new();
    let mut cleared = Vec::new();
    for spec in schema.fields() {
        let raw = draft.get(spec.name).map(str::trim).unwrap_or("");
        let raw = if raw.is_empty() {
            match spec.default {
                Some(default) => default,
                None => {
                    cleared.push(spec.name.to_string());
                    continue;
                }
            }
        } else {
            raw
        };

        let value = parse_field(spec.name, spec.kind, raw)?;
        fields.insert(spec.name.to_string(), value);
    }

    schema.normalize(&mut fields);
    schema.validate_record(&fields)?;
    // Derived by normalize.
    cleared.retain(|name| !fields.contains_key(name));

    Ok(ValidRecord { fields, cleared })
}

fn parse_field(name: &str, kind: FieldKind, raw: &str) -> Result<FieldValue, ValidationError> {
    match kind {
        FieldKind::Text => Ok(FieldValue::Text(raw.to_string())),
        FieldKind::Email => {
            if is_valid_email(raw) {
                Ok(FieldValue::Text(raw.to_string()))
            } else {
                Err(ValidationError::InvalidEmail {
                    field: name.to_string(),
                })
            }
        }
        FieldKind::Choice(options) => {
            if options.contains(&raw) {
                Ok(FieldValue::Text(raw.to_string()))
            } else {
                Err(ValidationError::InvalidChoice {
                    field: name.to_string(),
                    value: raw.to_string(),
                })
            }
        }
        FieldKind::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(FieldValue::Date)
            .map_err(|_| ValidationError::InvalidDate {
                field: name.to_string(),
                value: raw.to_string(),
            }),
        FieldKind::Reference(_) => match raw.parse::<i64>() {
            Ok(id) if id > 0 => Ok(FieldValue::Number(id)),
            _ => Err(ValidationError::InvalidReference {
                field: name.to_string(),
                value: raw.to_string(),
            }),
        },
    }
}

/// Accepts `local@domain.tld`: no whitespace anywhere, exactly one `@`, a
/// non-empty local part, and a domain with a `.` that has at least one
/// character on each side.
pub fn is_valid_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    let clean = |part: &str| !part.is_empty() && !part.chars().any(|c| c.is_whitespace() || c == '@');
    if !clean(local) || !clean(domain) {
        return false;
    }
    let last = domain.len() - 1;
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i < last)
}
