use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use crate::storage::StoreError;
use crate::transport::http::types::{error_response, AppState, ErrorResponse, MutationResult};

pub const PROJECT_HEADER: &str = "x-project-id";

/// Checks the bearer key and project id the store was started with.
pub fn authorize(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<(), (StatusCode, Json<ErrorResponse>)> {
    if let Some(expected) = state.public_key.as_deref() {
        let presented = headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));
        if presented != Some(expected) {
            return Err(error_response(
                StatusCode::UNAUTHORIZED,
                "Missing or invalid public key",
            ));
        }
    }
    if let Some(expected) = state.project_id.as_deref() {
        let presented = headers.get(PROJECT_HEADER).and_then(|v| v.to_str().ok());
        if presented != Some(expected) {
            return Err(error_response(StatusCode::FORBIDDEN, "Unknown project"));
        }
    }
    Ok(())
}

pub fn store_error_status(err: &StoreError) -> StatusCode {
    match err {
        StoreError::UnknownTable(_) | StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        StoreError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

pub fn store_error(err: StoreError) -> (StatusCode, Json<ErrorResponse>) {
    error_response(store_error_status(&err), err.to_string())
}

/// Folds per-record outcomes into the envelope.
///
/// The status is 200 when anything succeeded; when everything failed it is
/// the status of the first failure, so single-record callers see 404/422.
pub fn mutation_results<T>(
    results: Vec<Result<T, StoreError>>,
    data: impl Fn(T) -> Option<serde_json::Value>,
) -> (StatusCode, bool, Vec<MutationResult>) {
    let mut status = None;
    let mut any_ok = false;
    let mut out = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(v) => {
                any_ok = true;
                out.push(MutationResult {
                    success: true,
                    data: data(v),
                    message: None,
                });
            }
            Err(e) => {
                status.get_or_insert(store_error_status(&e));
                out.push(MutationResult {
                    success: false,
                    data: None,
                    message: Some(e.to_string()),
                });
            }
        }
    }
    let all_ok = status.is_none();
    let status = if any_ok || all_ok {
        StatusCode::OK
    } else {
        status.unwrap_or(StatusCode::UNPROCESSABLE_ENTITY)
    };
    (status, all_ok, out)
}
