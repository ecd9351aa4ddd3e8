use crate::transport::http::types::{AppState, RecordResponse};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up; lists row counts per table", body = RecordResponse)
    )
)]
pub async fn healthcheck_handler(State(state): State<AppState>) -> impl IntoResponse {
    let tables: Vec<serde_json::Value> = state
        .store
        .counts()
        .await
        .into_iter()
        .map(|(table, rows)| serde_json::json!({ "table": table, "rows": rows }))
        .collect();

    (
        StatusCode::OK,
        Json(RecordResponse {
            success: true,
            data: Some(serde_json::json!({ "status": "ok", "tables": tables })),
            message: None,
        }),
    )
}
