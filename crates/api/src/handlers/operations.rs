//! `GET /api/v1/operations/{id}` -- vendor operation status.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use tourforge_pipeline::WorkflowError;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct OperationStatus {
    pub operation_id: String,
    pub done: bool,
    pub progress_percent: Option<u8>,
    /// Vendor error, verbatim, for failed operations.
    pub error: Option<Value>,
}

/// GET /api/v1/operations/{id}
pub async fn get_operation(
    State(state): State<AppState>,
    Path(operation_id): Path<String>,
) -> AppResult<Json<DataResponse<OperationStatus>>> {
    let status = state.api.get_operation(&operation_id).await.map_err(|e| {
        WorkflowError::from_vendor(e, |vendor_status, vendor_body| {
            WorkflowError::StatusQueryFailed {
                operation_id: operation_id.clone(),
                vendor_status,
                vendor_body,
            }
        })
    })?;

    Ok(Json(DataResponse {
        data: OperationStatus {
            operation_id,
            done: status.done,
            progress_percent: status.progress_percent,
            error: status.error,
        },
    }))
}
