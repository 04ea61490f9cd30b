//! `POST /api/v1/generate` -- submit a generation request.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tourforge_core::request::GenerationRequest;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub operation_id: String,
}

/// POST /api/v1/generate
///
/// Media must already be referenced by URL, media id or inline base64;
/// use `POST /media` first for local files. Returns as soon as the vendor
/// has accepted the job; poll `GET /operations/{id}` for progress.
pub async fn generate(
    State(state): State<AppState>,
    Json(input): Json<GenerationRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<GenerateResponse>>)> {
    let handle = state.workflow.start(&input).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: GenerateResponse {
                operation_id: handle.operation_id,
            },
        }),
    ))
}
