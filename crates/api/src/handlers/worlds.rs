//! `GET /api/v1/worlds/{id}` -- viewer URL for a generated world.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use tourforge_pipeline::resolve::{default_view_url, lookup_view_url};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct WorldView {
    pub world_id: String,
    pub view_url: String,
}

/// GET /api/v1/worlds/{id}
///
/// Prefers the canonical URL from world metadata and falls back to the
/// viewer URL template when the lookup fails.
pub async fn get_world(
    State(state): State<AppState>,
    Path(world_id): Path<String>,
) -> AppResult<Json<DataResponse<WorldView>>> {
    let view_url = match lookup_view_url(&state.api, &world_id).await {
        Some(url) => url,
        None => default_view_url(&state.workflow.config().resolve.viewer_base_url, &world_id),
    };

    Ok(Json(DataResponse {
        data: WorldView { world_id, view_url },
    }))
}
