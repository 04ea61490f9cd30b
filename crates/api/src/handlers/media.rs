//! `POST /api/v1/media` -- forward one uploaded file to the vendor.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use tourforge_core::media::{MediaPayload, MediaReference};
use tourforge_marble::api::MEDIA_FIELD;
use tourforge_pipeline::upload::MediaUploader;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/media
///
/// Accepts a multipart form with a required `file` field. The part's
/// content type is kept; otherwise it is inferred from the filename.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<MediaReference>>)> {
    let mut payload: Option<MediaPayload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(MEDIA_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload.bin").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let mut media = MediaPayload::new(bytes.to_vec(), filename);
        if let Some(mime) = content_type {
            media = media.with_mime_type(mime);
        }
        payload = Some(media);
    }

    let payload =
        payload.ok_or_else(|| AppError::BadRequest(format!("Missing required '{MEDIA_FIELD}' field")))?;

    let reference = MediaUploader::new(&state.api).upload(&payload).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: reference })))
}
