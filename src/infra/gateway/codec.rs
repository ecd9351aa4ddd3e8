//! Conversion between the store's wire records and canonical records.

use serde_json::{Map, Value as JsonValue};

use crate::domain::model::{EntitySchema, FieldValue, Fields, Record, RecordId};
use crate::domain::validate::ValidRecord;
use crate::infra::gateway::GatewayError;
use crate::storage::ID_FIELD;

/// Reads the primary key. Older rows and local fixtures use `id`.
pub fn wire_id(value: &JsonValue) -> Option<RecordId> {
    let raw = value.get(ID_FIELD).or_else(|| value.get("id"))?;
    if let Some(n) = raw.as_i64() {
        return Some(RecordId(n));
    }
    raw.as_str().and_then(|s| s.parse().ok())
}

/// Decodes a wire record into the schema's canonical shape.
///
/// Keys are matched by wire name first, then by canonical name. Keys the
/// schema does not know (system columns such as `CreatedOn`) are dropped.
pub fn record_from_wire(schema: &dyn EntitySchema, value: &JsonValue) -> Result<Record, GatewayError> {
    let obj = value
        .as_object()
        .ok_or_else(|| GatewayError::Decode("record is not an object".to_string()))?;
    let id = wire_id(value).ok_or_else(|| {
        GatewayError::Decode(format!("record in '{}' has no id", schema.table_name()))
    })?;

    let mut fields = Fields::new();
    for (key, v) in obj {
        if v.is_null() {
            continue;
        }
        let Some(spec) = schema
            .field_by_wire_name(key)
            .or_else(|| schema.field(key))
        else {
            continue;
        };
        let value = FieldValue::from_json(spec.kind, v)
            .map_err(|e| GatewayError::Decode(format!("field '{}': {}", key, e)))?;
        fields.insert(spec.name.to_string(), value);
    }

    Ok(Record::new(id, fields))
}

/// Encodes canonical fields with wire names, adding `Id` when updating.
pub fn fields_to_wire(schema: &dyn EntitySchema, fields: &Fields, id: Option<RecordId>) -> JsonValue {
    let mut obj = Map::new();
    if let Some(id) = id {
        obj.insert(ID_FIELD.to_string(), JsonValue::from(id.0));
    }
    for (name, value) in fields {
        let key = schema
            .field(name)
            .map(|f| f.wire_name)
            .unwrap_or(name.as_str());
        obj.insert(key.to_string(), value.to_json());
    }
    JsonValue::Object(obj)
}

/// Encodes an update: the changed fields plus an explicit `null` for every
/// cleared optional field, so the store drops its old value.
pub fn update_to_wire(schema: &dyn EntitySchema, id: RecordId, record: &ValidRecord) -> JsonValue {
    let mut payload = fields_to_wire(schema, &record.fields, Some(id));
    if let JsonValue::Object(obj) = &mut payload {
        for name in &record.cleared {
            let key = schema.field(name).map(|f| f.wire_name).unwrap_or(name.as_str());
            obj.insert(key.to_string(), JsonValue::Null);
        }
    }
    payload
}
