//! Local-mode derivation of the visible page: search, filter, sort, slice.

use chrono::NaiveDate;
use serde_json::Value as JsonValue;
use std::cmp::Ordering;

use crate::domain::model::{EntitySchema, FieldValue, Record};
use crate::domain::query::state::{total_pages, ListState, SortDirection, SortSpec};

/// Comparable form of a field value. Text compares case-insensitively and
/// missing values sort before everything else.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    Missing,
    Number(i64),
    Date(NaiveDate),
    Text(String),
}

impl SortKey {
    pub fn of(value: Option<&FieldValue>) -> Self {
        match value {
            None => SortKey::Missing,
            Some(FieldValue::Text(s)) => SortKey::Text(s.to_lowercase()),
            Some(FieldValue::Number(n)) => SortKey::Number(*n),
            Some(FieldValue::Date(d)) => SortKey::Date(*d),
        }
    }

    /// Same ordering for raw wire values (dates sort correctly as ISO strings).
    pub fn of_json(value: Option<&JsonValue>) -> Self {
        match value {
            None | Some(JsonValue::Null) => SortKey::Missing,
            Some(JsonValue::String(s)) => SortKey::Text(s.to_lowercase()),
            Some(v) => match v.as_i64() {
                Some(n) => SortKey::Number(n),
                None => SortKey::Text(v.to_string().to_lowercase()),
            },
        }
    }
}

pub fn apply_direction(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

/// Case-insensitive substring match over `fields`; an empty term matches everything.
pub fn matches_search(record: &Record, fields: &[&str], term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    fields.iter().any(|f| {
        record
            .get(f)
            .map(|v| v.to_string().to_lowercase().contains(&needle))
            .unwrap_or(false)
    })
}

/// Exact match on every constrained dimension.
pub fn matches_filters(record: &Record, state: &ListState) -> bool {
    state.active_filters().all(|(dim, value)| {
        record
            .get(dim)
            .map(|v| v.to_string() == value)
            .unwrap_or(false)
    })
}

/// Stable sort; ties keep their input order.
pub fn sort_records(records: &mut [Record], sort: &SortSpec) {
    records.sort_by(|a, b| {
        let ordering = SortKey::of(a.get(&sort.field)).cmp(&SortKey::of(b.get(&sort.field)));
        apply_direction(ordering, sort.direction)
    });
}

/// Result of a local derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    pub rows: Vec<Record>,
    pub match_count: usize,
    pub total_pages: usize,
}

/// Runs search, filter, sort and slice over `records` for the state's current page.
///
/// The caller is expected to have clamped the page; an out-of-range page
/// yields an empty slice.
pub fn project(records: &[Record], schema: &dyn EntitySchema, state: &ListState) -> Projection {
    let mut matched: Vec<Record> = records
        .iter()
        .filter(|r| matches_search(r, schema.search_fields(), state.search_term()))
        .filter(|r| matches_filters(r, state))
        .cloned()
        .collect();
    sort_records(&mut matched, state.sort());

    let match_count = matched.len();
    let rows = matched
        .into_iter()
        .skip(state.offset())
        .take(state.page_size())
        .collect();

    Projection {
        rows,
        match_count,
        total_pages: total_pages(match_count, state.page_size()),
    }
}
