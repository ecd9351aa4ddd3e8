use crate::domain::query::{Condition, Operator, OrderBy, PagingInfo, QueryParams, SortDirection};
use crate::transport::http::handlers::{health, records};
use crate::transport::http::types::{
    AppState, DeleteRequest, ErrorResponse, FetchResponse, MutationResponse, MutationResult,
    RecordResponse, RecordsRequest,
};
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        records::query_records_handler,
        records::get_record_handler,
        records::create_records_handler,
        records::update_records_handler,
        records::delete_records_handler
    ),
    components(schemas(
        QueryParams,
        Condition,
        Operator,
        PagingInfo,
        OrderBy,
        SortDirection,
        FetchResponse,
        RecordResponse,
        RecordsRequest,
        DeleteRequest,
        MutationResult,
        MutationResponse,
        ErrorResponse
    ))
)]
pub struct ApiDoc;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route(
            "/api/tables/:table/records/query",
            post(records::query_records_handler),
        )
        .route(
            "/api/tables/:table/records",
            post(records::create_records_handler)
                .put(records::update_records_handler)
                .delete(records::delete_records_handler),
        )
        .route(
            "/api/tables/:table/records/:id",
            get(records::get_record_handler),
        )
        .with_state(app_state)
}
