//! The remote collection gateway: the only path from the controller to stored data.

pub mod codec;
pub mod memory;

pub use memory::InMemoryGateway;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::model::{EntitySchema, Fields, Record, RecordId};
use crate::domain::query::QueryParams;
use crate::domain::validate::ValidRecord;
use crate::storage::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Network failure or an unexpected server status.
    #[error("Could not reach the record store: {0}")]
    Transport(String),

    #[error("Not authorized by the record store: {0}")]
    Unauthorized(String),

    #[error("Record {id} no longer exists in '{table}'")]
    NotFound { table: String, id: RecordId },

    /// The store refused the payload.
    #[error("The record store rejected the request: {0}")]
    Validation(String),

    #[error("Unexpected response from the record store: {0}")]
    Decode(String),
}

impl GatewayError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::NotFound { .. })
    }

    /// Transport-class failures (network, auth, server) may be retried by the user.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            GatewayError::Transport(_) | GatewayError::Unauthorized(_) | GatewayError::Decode(_)
        )
    }
}

impl From<StoreError> for GatewayError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound { table, id } => GatewayError::NotFound { table, id },
            StoreError::Validation(msg) => GatewayError::Validation(msg),
            StoreError::UnknownTable(_) => GatewayError::Transport(value.to_string()),
        }
    }
}

/// One page of a list query plus the total number of matches.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListPage {
    pub records: Vec<Record>,
    pub total: usize,
}

/// CRUD access to one hosted record store, parameterized by entity schema.
///
/// Implementations normalize the store's representation into canonical
/// [`Record`]s. They never retry; callers decide whether to reissue.
#[async_trait]
pub trait RecordGateway: Send + Sync {
    async fn list(
        &self,
        schema: &dyn EntitySchema,
        query: &QueryParams,
    ) -> Result<ListPage, GatewayError>;

    async fn get_by_id(
        &self,
        schema: &dyn EntitySchema,
        id: RecordId,
    ) -> Result<Record, GatewayError>;

    /// Persists a new record; the store assigns its id.
    async fn create(
        &self,
        schema: &dyn EntitySchema,
        fields: &Fields,
    ) -> Result<Record, GatewayError>;

    /// Applies `record` to the stored row: its fields overwrite, its cleared
    /// fields are erased, everything else is kept.
    async fn update(
        &self,
        schema: &dyn EntitySchema,
        id: RecordId,
        record: &ValidRecord,
    ) -> Result<Record, GatewayError>;

    /// Returns `false` when the store acknowledged the call but did not delete.
    async fn delete(&self, schema: &dyn EntitySchema, id: RecordId) -> Result<bool, GatewayError>;
}
