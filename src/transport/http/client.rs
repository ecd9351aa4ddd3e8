use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use crate::domain::model::{EntitySchema, Fields, Record, RecordId};
use crate::domain::query::QueryParams;
use crate::infra::config::GatewayConfig;
use crate::domain::validate::ValidRecord;
use crate::infra::gateway::codec::{fields_to_wire, record_from_wire, update_to_wire};
use crate::infra::gateway::{GatewayError, ListPage, RecordGateway};
use crate::transport::http::handlers::common::PROJECT_HEADER;
use crate::transport::http::types::{
    DeleteRequest, ErrorResponse, FetchResponse, MutationResponse, RecordResponse, RecordsRequest,
};

/// Gateway that talks to a hosted record store over HTTP.
#[derive(Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
    project_id: String,
    public_key: String,
}

impl HttpGateway {
    pub fn new(config: &GatewayConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            public_key: config.public_key.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /health`, returned as-is.
    pub async fn health(&self) -> Result<serde_json::Value, GatewayError> {
        let url = format!("{}/health", self.base_url);
        self.send(self.request(Method::GET, &url), None).await
    }

    fn records_url(&self, table: &str) -> String {
        format!("{}/api/tables/{}/records", self.base_url, table)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(PROJECT_HEADER, &self.project_id)
            .bearer_auth(&self.public_key)
    }

    /// Sends and decodes. `target` names the record a 404 refers to; without
    /// one a 404 means the table or route is missing and is a transport failure.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        target: Option<(&str, RecordId)>,
    ) -> Result<T, GatewayError> {
        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        let status = response.status();

        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| GatewayError::Decode(e.to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body);
        tracing::debug!(%status, %message, "record store returned an error");
        Err(map_status(status, message, target))
    }
}

fn error_message(body: &str) -> String {
    if let Ok(err) = serde_json::from_str::<ErrorResponse>(body) {
        return err.message;
    }
    if let Ok(resp) = serde_json::from_str::<MutationResponse>(body) {
        if let Some(message) = resp.results.into_iter().find_map(|r| r.message) {
            return message;
        }
    }
    body.trim().to_string()
}

fn map_status(status: StatusCode, message: String, target: Option<(&str, RecordId)>) -> GatewayError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GatewayError::Unauthorized(message),
        StatusCode::NOT_FOUND => match target {
            Some((table, id)) => GatewayError::NotFound {
                table: table.to_string(),
                id,
            },
            None => GatewayError::Transport(format!("HTTP {}: {}", status.as_u16(), message)),
        },
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            GatewayError::Validation(message)
        }
        _ => GatewayError::Transport(format!("HTTP {}: {}", status.as_u16(), message)),
    }
}

/// First result of a single-record mutation; a failed one counts as a rejection.
fn single_result(response: MutationResponse) -> Result<serde_json::Value, GatewayError> {
    let result = response
        .results
        .into_iter()
        .next()
        .ok_or_else(|| GatewayError::Decode("empty results".to_string()))?;
    if !result.success {
        return Err(GatewayError::Validation(
            result.message.unwrap_or_else(|| "record rejected".to_string()),
        ));
    }
    result
        .data
        .ok_or_else(|| GatewayError::Decode("result carried no record".to_string()))
}

#[async_trait]
impl RecordGateway for HttpGateway {
    async fn list(
        &self,
        schema: &dyn EntitySchema,
        query: &QueryParams,
    ) -> Result<ListPage, GatewayError> {
        let url = format!("{}/query", self.records_url(schema.table_name()));
        let response: FetchResponse = self
            .send(self.request(Method::POST, &url).json(query), None)
            .await?;
        if !response.success {
            return Err(GatewayError::Transport(
                response.message.unwrap_or_else(|| "query failed".to_string()),
            ));
        }
        let records = response
            .data
            .iter()
            .map(|row| record_from_wire(schema, row))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ListPage {
            records,
            total: response.total,
        })
    }

    async fn get_by_id(
        &self,
        schema: &dyn EntitySchema,
        id: RecordId,
    ) -> Result<Record, GatewayError> {
        let table = schema.table_name();
        let url = format!("{}/{}", self.records_url(table), id);
        let response: RecordResponse = self
            .send(self.request(Method::GET, &url), Some((table, id)))
            .await?;
        match response.data {
            Some(row) if response.success => record_from_wire(schema, &row),
            _ => Err(GatewayError::NotFound {
                table: table.to_string(),
                id,
            }),
        }
    }

    async fn create(
        &self,
        schema: &dyn EntitySchema,
        fields: &Fields,
    ) -> Result<Record, GatewayError> {
        let body = RecordsRequest {
            records: vec![fields_to_wire(schema, fields, None)],
        };
        let url = self.records_url(schema.table_name());
        let response: MutationResponse = self
            .send(self.request(Method::POST, &url).json(&body), None)
            .await?;
        record_from_wire(schema, &single_result(response)?)
    }

    async fn update(
        &self,
        schema: &dyn EntitySchema,
        id: RecordId,
        record: &ValidRecord,
    ) -> Result<Record, GatewayError> {
        let table = schema.table_name();
        let body = RecordsRequest {
            records: vec![update_to_wire(schema, id, record)],
        };
        let url = self.records_url(table);
        let response: MutationResponse = self
            .send(self.request(Method::PUT, &url).json(&body), Some((table, id)))
            .await?;
        record_from_wire(schema, &single_result(response)?)
    }

    async fn delete(&self, schema: &dyn EntitySchema, id: RecordId) -> Result<bool, GatewayError> {
        let table = schema.table_name();
        let body = DeleteRequest {
            record_ids: vec![id],
        };
        let url = self.records_url(table);
        let response: MutationResponse = self
            .send(self.request(Method::DELETE, &url).json(&body), Some((table, id)))
            .await?;
        tracing::debug!(table, %id, ok = response.success, "delete acknowledged");
        Ok(response.success && response.results.iter().all(|r| r.success))
    }
}

