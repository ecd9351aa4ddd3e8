use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::model::{EntitySchema, Fields, Record, RecordId};
use crate::domain::query::QueryParams;
use crate::domain::validate::ValidRecord;
use crate::infra::gateway::codec::{fields_to_wire, record_from_wire, update_to_wire};
use crate::infra::gateway::{GatewayError, ListPage, RecordGateway};
use crate::storage::RecordStore;

/// Gateway backed by an in-process [`RecordStore`].
///
/// Goes through the same wire encoding as the HTTP gateway, so records take
/// the same shape either way.
#[derive(Clone)]
pub struct InMemoryGateway {
    store: Arc<RecordStore>,
}

impl InMemoryGateway {
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }
}

#[async_trait]
impl RecordGateway for InMemoryGateway {
    async fn list(
        &self,
        schema: &dyn EntitySchema,
        query: &QueryParams,
    ) -> Result<ListPage, GatewayError> {
        let (rows, total) = self.store.query(schema.table_name(), query).await?;
        let records = rows
            .iter()
            .map(|row| record_from_wire(schema, row))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ListPage { records, total })
    }

    async fn get_by_id(
        &self,
        schema: &dyn EntitySchema,
        id: RecordId,
    ) -> Result<Record, GatewayError> {
        let row = self.store.get(schema.table_name(), id).await?;
        record_from_wire(schema, &row)
    }

    async fn create(
        &self,
        schema: &dyn EntitySchema,
        fields: &Fields,
    ) -> Result<Record, GatewayError> {
        let payload = fields_to_wire(schema, fields, None);
        let mut results = self.store.create(schema.table_name(), vec![payload]).await?;
        let row = results
            .pop()
            .ok_or_else(|| GatewayError::Decode("empty create result".to_string()))??;
        record_from_wire(schema, &row)
    }

    async fn update(
        &self,
        schema: &dyn EntitySchema,
        id: RecordId,
        record: &ValidRecord,
    ) -> Result<Record, GatewayError> {
        let payload = update_to_wire(schema, id, record);
        let mut results = self.store.update(schema.table_name(), vec![payload]).await?;
        let row = results
            .pop()
            .ok_or_else(|| GatewayError::Decode("empty update result".to_string()))??;
        record_from_wire(schema, &row)
    }

    async fn delete(&self, schema: &dyn EntitySchema, id: RecordId) -> Result<bool, GatewayError> {
        let mut results = self.store.delete(schema.table_name(), &[id]).await?;
        match results.pop() {
            Some(result) => result.map(|_| true).map_err(GatewayError::from),
            None => Ok(false),
        }
    }
}
