use crate::domain::model::RecordId;
use crate::domain::query::QueryParams;
use crate::transport::http::handlers::common::{authorize, mutation_results, store_error};
use crate::transport::http::types::{
    json_422, AppState, DeleteRequest, ErrorResponse, FetchResponse, MutationResponse,
    RecordResponse, RecordsRequest,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

#[utoipa::path(
    post,
    path = "/api/tables/{table}/records/query",
    params(
        ("table" = String, Path, description = "Table name (e.g. employee1)")
    ),
    request_body = QueryParams,
    responses(
        (status = 200, description = "Matching page and total count", body = FetchResponse),
        (status = 401, description = "Missing or invalid public key", body = ErrorResponse),
        (status = 404, description = "Unknown table", body = ErrorResponse),
        (status = 422, description = "Invalid JSON body", body = ErrorResponse)
    )
)]
pub async fn query_records_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(table): Path<String>,
    request: Result<Json<QueryParams>, JsonRejection>,
) -> impl IntoResponse {
    if let Err(resp) = authorize(&state, &headers) {
        return resp.into_response();
    }
    let Json(params) = match request {
        Ok(v) => v,
        Err(e) => {
            return json_422(e, r#"{"where": [...], "pagingInfo": {...}, "orderBy": [...]}"#)
                .into_response()
        }
    };

    match state.store.query(&table, &params).await {
        Ok((data, total)) => (
            StatusCode::OK,
            Json(FetchResponse {
                success: true,
                data,
                total,
                message: None,
            }),
        )
            .into_response(),
        Err(e) => store_error(e).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/tables/{table}/records/{id}",
    params(
        ("table" = String, Path, description = "Table name"),
        ("id" = i64, Path, description = "Record Id")
    ),
    responses(
        (status = 200, description = "Record found", body = RecordResponse),
        (status = 401, description = "Missing or invalid public key", body = ErrorResponse),
        (status = 404, description = "Unknown table or record", body = ErrorResponse)
    )
)]
pub async fn get_record_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((table, id)): Path<(String, i64)>,
) -> impl IntoResponse {
    if let Err(resp) = authorize(&state, &headers) {
        return resp.into_response();
    }

    match state.store.get(&table, RecordId(id)).await {
        Ok(record) => (
            StatusCode::OK,
            Json(RecordResponse {
                success: true,
                data: Some(record),
                message: None,
            }),
        )
            .into_response(),
        Err(e) => store_error(e).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/tables/{table}/records",
    params(
        ("table" = String, Path, description = "Table name")
    ),
    request_body = RecordsRequest,
    responses(
        (status = 200, description = "Per-record results", body = MutationResponse),
        (status = 401, description = "Missing or invalid public key", body = ErrorResponse),
        (status = 404, description = "Unknown table", body = ErrorResponse),
        (status = 422, description = "Every record was rejected", body = MutationResponse)
    )
)]
pub async fn create_records_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(table): Path<String>,
    request: Result<Json<RecordsRequest>, JsonRejection>,
) -> impl IntoResponse {
    if let Err(resp) = authorize(&state, &headers) {
        return resp.into_response();
    }
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return json_422(e, r#"{"records": [...]}"#).into_response(),
    };

    match state.store.create(&table, request.records).await {
        Ok(results) => {
            let (status, success, results) = mutation_results(results, Some);
            (
                status,
                Json(MutationResponse {
                    success,
                    results,
                    message: None,
                }),
            )
                .into_response()
        }
        Err(e) => store_error(e).into_response(),
    }
}

#[utoipa::path(
    put,
    path = "/api/tables/{table}/records",
    params(
        ("table" = String, Path, description = "Table name")
    ),
    request_body = RecordsRequest,
    responses(
        (status = 200, description = "Per-record results", body = MutationResponse),
        (status = 401, description = "Missing or invalid public key", body = ErrorResponse),
        (status = 404, description = "Unknown table, or no record matched", body = MutationResponse),
        (status = 422, description = "Every record was rejected", body = MutationResponse)
    )
)]
pub async fn update_records_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(table): Path<String>,
    request: Result<Json<RecordsRequest>, JsonRejection>,
) -> impl IntoResponse {
    if let Err(resp) = authorize(&state, &headers) {
        return resp.into_response();
    }
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return json_422(e, r#"{"records": [{"Id": 1, ...}]}"#).into_response(),
    };

    match state.store.update(&table, request.records).await {
        Ok(results) => {
            let (status, success, results) = mutation_results(results, Some);
            (
                status,
                Json(MutationResponse {
                    success,
                    results,
                    message: None,
                }),
            )
                .into_response()
        }
        Err(e) => store_error(e).into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/tables/{table}/records",
    params(
        ("table" = String, Path, description = "Table name")
    ),
    request_body = DeleteRequest,
    responses(
        (status = 200, description = "Per-record results", body = MutationResponse),
        (status = 401, description = "Missing or invalid public key", body = ErrorResponse),
        (status = 404, description = "Unknown table, or no record matched", body = MutationResponse)
    )
)]
pub async fn delete_records_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(table): Path<String>,
    request: Result<Json<DeleteRequest>, JsonRejection>,
) -> impl IntoResponse {
    if let Err(resp) = authorize(&state, &headers) {
        return resp.into_response();
    }
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return json_422(e, r#"{"RecordIds": [1, 2]}"#).into_response(),
    };

    match state.store.delete(&table, &request.record_ids).await {
        Ok(results) => {
            let (status, success, results) =
                mutation_results(results, |id| Some(json!({ "Id": id })));
            (
                status,
                Json(MutationResponse {
                    success,
                    results,
                    message: None,
                }),
            )
                .into_response()
        }
        Err(e) => store_error(e).into_response(),
    }
}
