use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::domain::model::RecordId;
use crate::storage::RecordStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RecordStore>,
    /// When set, requests must carry `Authorization: Bearer <key>`.
    pub public_key: Option<String>,
    /// When set, requests must carry a matching `x-project-id`.
    pub project_id: Option<String>,
}

impl AppState {
    /// Open store: no credentials checked.
    pub fn open(store: Arc<RecordStore>) -> Self {
        Self {
            store,
            public_key: None,
            project_id: None,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, ToSchema)]
pub struct FetchResponse {
    pub success: bool,
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<JsonValue>,
    /// Number of records matching the conditions, ignoring paging.
    #[serde(default)]
    pub total: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, ToSchema)]
pub struct RecordResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub data: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, ToSchema)]
pub struct RecordsRequest {
    #[schema(value_type = Vec<Object>)]
    pub records: Vec<JsonValue>,
}

#[derive(Deserialize, Serialize, Debug, ToSchema)]
pub struct DeleteRequest {
    #[serde(rename = "RecordIds")]
    #[schema(value_type = Vec<i64>)]
    pub record_ids: Vec<RecordId>,
}

#[derive(Deserialize, Serialize, Debug, ToSchema, Clone)]
pub struct MutationResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub data: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, ToSchema)]
pub struct MutationResponse {
    pub success: bool,
    #[serde(default)]
    pub results: Vec<MutationResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            success: false,
            message: message.into(),
        }),
    )
}

pub fn json_422(err: JsonRejection, expected: &str) -> (StatusCode, Json<ErrorResponse>) {
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        format!("Invalid JSON body: {} (expected: {})", err, expected),
    )
}
