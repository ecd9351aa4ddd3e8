//! Query shape understood by the hosted record store.
//!
//! ```json
//! {
//!   "where":      [{ "fieldName": "status", "operator": "ExactMatch", "values": ["active"] }],
//!   "pagingInfo": { "limit": 10, "offset": 20 },
//!   "orderBy":    [{ "field": "Name", "direction": "asc" }]
//! }
//! ```
//!
//! Conditions are ANDed. Field names are wire names, not canonical ones.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

use crate::domain::model::EntitySchema;
use crate::domain::query::state::{ListState, SortDirection};

#[derive(Deserialize, Serialize, Debug, ToSchema, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Case-insensitive substring match.
    Contains,
    /// Equal to any of the listed values.
    ExactMatch,
}

#[derive(Deserialize, Serialize, Debug, ToSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub field_name: String,
    pub operator: Operator,
    #[schema(value_type = Vec<Object>)]
    pub values: Vec<JsonValue>,
}

impl Condition {
    pub fn contains(field_name: &str, value: &str) -> Self {
        Self {
            field_name: field_name.to_string(),
            operator: Operator::Contains,
            values: vec![JsonValue::from(value)],
        }
    }

    pub fn exact(field_name: &str, value: &str) -> Self {
        Self {
            field_name: field_name.to_string(),
            operator: Operator::ExactMatch,
            values: vec![JsonValue::from(value)],
        }
    }
}

#[derive(Deserialize, Serialize, Debug, ToSchema, Clone, Copy, PartialEq, Eq)]
pub struct PagingInfo {
    pub limit: usize,
    pub offset: usize,
}

#[derive(Deserialize, Serialize, Debug, ToSchema, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

#[derive(Deserialize, Serialize, Debug, ToSchema, Clone, PartialEq, Default)]
pub struct QueryParams {
    #[serde(default, rename = "where")]
    pub r#where: Vec<Condition>,
    #[serde(default, rename = "pagingInfo", skip_serializing_if = "Option::is_none")]
    pub paging_info: Option<PagingInfo>,
    #[serde(default, rename = "orderBy")]
    pub order_by: Vec<OrderBy>,
}

impl QueryParams {
    /// Serializes a list view's state for the remote-query mode.
    ///
    /// The wire has no OR, so the search term becomes a single `Contains` on
    /// the schema's first search field. Canonical names are mapped to wire
    /// names; unknown fields are passed through unchanged.
    pub fn from_state(schema: &dyn EntitySchema, state: &ListState) -> Self {
        let wire = |name: &str| -> String {
            schema
                .field(name)
                .map(|f| f.wire_name.to_string())
                .unwrap_or_else(|| name.to_string())
        };

        let mut conditions = Vec::new();
        if !state.search_term().is_empty() {
            if let Some(primary) = schema.search_fields().first() {
                conditions.push(Condition::contains(&wire(primary), state.search_term()));
            }
        }
        for (dim, value) in state.active_filters() {
            conditions.push(Condition::exact(&wire(dim), value));
        }

        QueryParams {
            r#where: conditions,
            paging_info: Some(PagingInfo {
                limit: state.page_size(),
                offset: state.offset(),
            }),
            order_by: vec![OrderBy {
                field: wire(&state.sort().field),
                direction: state.sort().direction,
            }],
        }
    }

    /// One unsorted page, no conditions.
    pub fn page(limit: usize, offset: usize) -> Self {
        QueryParams {
            r#where: Vec::new(),
            paging_info: Some(PagingInfo { limit, offset }),
            order_by: Vec::new(),
        }
    }

    /// Smallest query that still reports the total for `conditions`.
    pub fn count(conditions: Vec<Condition>) -> Self {
        QueryParams {
            r#where: conditions,
            paging_info: Some(PagingInfo {
                limit: 1,
                offset: 0,
            }),
            order_by: Vec::new(),
        }
    }
}
