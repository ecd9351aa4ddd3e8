//! In-process record store speaking the hosted store's data model.
//!
//! Rows are kept in wire form (`Id` plus wire field names) so that the HTTP
//! surface in `transport::http` and `InMemoryGateway` see exactly what a
//! remote client would see. Writes are checked against the registered
//! schema: unknown fields, wrongly typed values and blank required fields are
//! rejected the way the hosted store rejects them.

use serde_json::{Map, Value as JsonValue};
use std::cmp::Ordering;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::domain::model::{EntitySchema, FieldValue, RecordId, SchemaRegistry};
use crate::domain::query::projection::apply_direction;
use crate::domain::query::{Condition, Operator, QueryParams, SortKey};

/// Wire name of the primary key.
pub const ID_FIELD: &str = "Id";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Table '{0}' does not exist")]
    UnknownTable(String),

    #[error("Record {id} not found in '{table}'")]
    NotFound { table: String, id: RecordId },

    #[error("{0}")]
    Validation(String),
}

#[derive(Default)]
struct Table {
    next_id: i64,
    rows: Vec<Map<String, JsonValue>>,
}

pub struct RecordStore {
    registry: SchemaRegistry,
    tables: RwLock<HashMap<String, Table>>,
}

impl RecordStore {
    pub fn new(registry: SchemaRegistry) -> Self {
        let tables = registry
            .list_tables()
            .into_iter()
            .map(|t| (t, Table::default()))
            .collect();
        Self {
            registry,
            tables: RwLock::new(tables),
        }
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Filters, sorts and pages a table. Returns the page and the total match count.
    pub async fn query(
        &self,
        table: &str,
        params: &QueryParams,
    ) -> Result<(Vec<JsonValue>, usize), StoreError> {
        let tables = self.tables.read().await;
        let t = tables
            .get(table)
            .ok_or_else(|| StoreError::UnknownTable(table.to_string()))?;

        let mut matched: Vec<&Map<String, JsonValue>> = t
            .rows
            .iter()
            .filter(|row| params.r#where.iter().all(|c| condition_matches(row, c)))
            .collect();

        if !params.order_by.is_empty() {
            matched.sort_by(|a, b| {
                params
                    .order_by
                    .iter()
                    .map(|o| {
                        let ordering = SortKey::of_json(a.get(&o.field))
                            .cmp(&SortKey::of_json(b.get(&o.field)));
                        apply_direction(ordering, o.direction)
                    })
                    .find(|o| *o != Ordering::Equal)
                    .unwrap_or(Ordering::Equal)
            });
        }

        let total = matched.len();
        let (offset, limit) = match params.paging_info {
            Some(p) => (p.offset, p.limit),
            None => (0, usize::MAX),
        };
        let page = matched
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|row| JsonValue::Object(row.clone()))
            .collect();

        Ok((page, total))
    }

    pub async fn get(&self, table: &str, id: RecordId) -> Result<JsonValue, StoreError> {
        let tables = self.tables.read().await;
        let t = tables
            .get(table)
            .ok_or_else(|| StoreError::UnknownTable(table.to_string()))?;
        t.rows
            .iter()
            .find(|row| row_id(row) == Some(id))
            .map(|row| JsonValue::Object(row.clone()))
            .ok_or_else(|| StoreError::NotFound {
                table: table.to_string(),
                id,
            })
    }

    /// Inserts each record, assigning a fresh `Id`. Records are handled
    /// independently; one rejection does not roll back the others.
    pub async fn create(
        &self,
        table: &str,
        records: Vec<JsonValue>,
    ) -> Result<Vec<Result<JsonValue, StoreError>>, StoreError> {
        let schema = self.schema(table)?;
        let mut tables = self.tables.write().await;
        let t = tables.entry(table.to_string()).or_default();

        let mut results = Vec::with_capacity(records.len());
        for record in records {
            let result = check_payload(schema.as_ref(), &record, false).and_then(|mut row| {
                check_required(schema.as_ref(), &row)?;
                t.next_id += 1;
                row.insert(ID_FIELD.to_string(), JsonValue::from(t.next_id));
                t.rows.push(row.clone());
                tracing::debug!(table, id = t.next_id, "record created");
                Ok(JsonValue::Object(row))
            });
            results.push(result);
        }
        Ok(results)
    }

    /// Merges each record into the stored row with the same `Id`. A `null`
    /// value removes the column from the row.
    pub async fn update(
        &self,
        table: &str,
        records: Vec<JsonValue>,
    ) -> Result<Vec<Result<JsonValue, StoreError>>, StoreError> {
        let schema = self.schema(table)?;
        let mut tables = self.tables.write().await;
        let t = tables.entry(table.to_string()).or_default();

        let mut results = Vec::with_capacity(records.len());
        for record in records {
            let result = check_payload(schema.as_ref(), &record, true).and_then(|changes| {
                let id = row_id(&changes).ok_or_else(|| {
                    StoreError::Validation(format!("Update requires an '{}' field", ID_FIELD))
                })?;
                let row = t
                    .rows
                    .iter_mut()
                    .find(|row| row_id(row) == Some(id))
                    .ok_or_else(|| StoreError::NotFound {
                        table: table.to_string(),
                        id,
                    })?;

                let mut merged = row.clone();
                for (key, value) in changes {
                    if value.is_null() {
                        merged.remove(&key);
                    } else {
                        merged.insert(key, value);
                    }
                }
                check_required(schema.as_ref(), &merged)?;
                *row = merged.clone();
                tracing::debug!(table, %id, "record updated");
                Ok(JsonValue::Object(merged))
            });
            results.push(result);
        }
        Ok(results)
    }

    pub async fn delete(
        &self,
        table: &str,
        ids: &[RecordId],
    ) -> Result<Vec<Result<RecordId, StoreError>>, StoreError> {
        let mut tables = self.tables.write().await;
        let t = tables
            .get_mut(table)
            .ok_or_else(|| StoreError::UnknownTable(table.to_string()))?;

        let results = ids
            .iter()
            .map(|id| -> Result<RecordId, StoreError> {
                let pos = t
                    .rows
                    .iter()
                    .position(|row| row_id(row) == Some(*id))
                    .ok_or_else(|| StoreError::NotFound {
                        table: table.to_string(),
                        id: *id,
                    })?;
                t.rows.remove(pos);
                tracing::debug!(table, %id, "record deleted");
                Ok(*id)
            })
            .collect();
        Ok(results)
    }

    /// Row counts per table, sorted by table name.
    pub async fn counts(&self) -> Vec<(String, usize)> {
        let tables = self.tables.read().await;
        let mut counts: Vec<(String, usize)> = tables
            .iter()
            .map(|(name, t)| (name.clone(), t.rows.len()))
            .collect();
        counts.sort();
        counts
    }

    fn schema(&self, table: &str) -> Result<std::sync::Arc<dyn EntitySchema>, StoreError> {
        self.registry
            .get(table)
            .ok_or_else(|| StoreError::UnknownTable(table.to_string()))
    }
}

fn row_id(row: &Map<String, JsonValue>) -> Option<RecordId> {
    row.get(ID_FIELD).and_then(JsonValue::as_i64).map(RecordId)
}

/// Plain-text form used by the match operators.
fn plain(v: &JsonValue) -> String {
    match v {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

fn condition_matches(row: &Map<String, JsonValue>, condition: &Condition) -> bool {
    let Some(value) = row.get(&condition.field_name) else {
        return false;
    };
    let value = plain(value);
    match condition.operator {
        Operator::Contains => {
            let haystack = value.to_lowercase();
            condition
                .values
                .iter()
                .any(|needle| haystack.contains(&plain(needle).to_lowercase()))
        }
        Operator::ExactMatch => condition.values.iter().any(|v| plain(v) == value),
    }
}

/// Checks field names and value types. `Id` is only allowed on updates.
fn check_payload(
    schema: &dyn EntitySchema,
    record: &JsonValue,
    allow_id: bool,
) -> Result<Map<String, JsonValue>, StoreError> {
    let obj = record
        .as_object()
        .ok_or_else(|| StoreError::Validation("Record must be a JSON object".to_string()))?;

    let mut out = Map::new();
    for (key, value) in obj {
        if key == ID_FIELD {
            if allow_id {
                out.insert(key.clone(), value.clone());
                continue;
            }
            return Err(StoreError::Validation(format!(
                "'{}' is assigned by the store",
                ID_FIELD
            )));
        }
        let spec = schema.field_by_wire_name(key).ok_or_else(|| {
            StoreError::Validation(format!(
                "Unknown field '{}' for table '{}'",
                key,
                schema.table_name()
            ))
        })?;
        if value.is_null() {
            out.insert(key.clone(), JsonValue::Null);
            continue;
        }
        FieldValue::from_json(spec.kind, value)
            .map_err(|e| StoreError::Validation(format!("Field '{}': {}", key, e)))?;
        out.insert(key.clone(), value.clone());
    }
    Ok(out)
}

fn check_required(schema: &dyn EntitySchema, row: &Map<String, JsonValue>) -> Result<(), StoreError> {
    let missing: Vec<&str> = schema
        .fields()
        .iter()
        .filter(|f| f.required)
        .filter(|f| {
            row.get(f.wire_name)
                .map(|v| plain(v).trim().is_empty())
                .unwrap_or(true)
        })
        .map(|f| f.wire_name)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(StoreError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )))
    }
}
