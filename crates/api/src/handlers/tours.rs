//! Tours resolved by this server.
//!
//! Routes:
//! - `POST /tours` -- resolve a finished operation into a tour
//! - `GET  /tours` -- list tours in insertion order

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tourforge_core::job::TourResult;
use tourforge_core::request::validate_display_name;
use tourforge_pipeline::resolve::resolve;
use tourforge_pipeline::WorkflowError;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTourRequest {
    pub operation_id: String,
    pub display_name: String,
}

/// POST /api/v1/tours
///
/// Returns 409 while the operation is still running. A failed operation
/// is reported as a vendor error.
pub async fn create_tour(
    State(state): State<AppState>,
    Json(input): Json<CreateTourRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<TourResult>>)> {
    validate_display_name(&input.display_name)?;
    if input.operation_id.trim().is_empty() {
        return Err(AppError::BadRequest("operation_id is required".into()));
    }

    let status = state.api.get_operation(&input.operation_id).await.map_err(|e| {
        WorkflowError::from_vendor(e, |vendor_status, vendor_body| {
            WorkflowError::StatusQueryFailed {
                operation_id: input.operation_id.clone(),
                vendor_status,
                vendor_body,
            }
        })
    })?;

    if !status.done {
        return Err(AppError::Conflict(format!(
            "Operation {} has not finished yet",
            input.operation_id
        )));
    }

    let tour = resolve(
        &state.api,
        &status,
        &input.display_name,
        &state.workflow.config().resolve,
    )
    .await?;

    state.tours.push(tour.clone()).await;
    tracing::info!(
        operation_id = %input.operation_id,
        world_id = %tour.world_id,
        "Tour added to session",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: tour })))
}

/// GET /api/v1/tours
pub async fn list_tours(State(state): State<AppState>) -> Json<DataResponse<Vec<TourResult>>> {
    Json(DataResponse {
        data: state.tours.list().await,
    })
}
