//! Result resolver.
//!
//! Turns a finished operation into a [`TourResult`]. The viewer URL is
//! built from the configured viewer base and optionally replaced by the
//! canonical URL from world metadata; a failed metadata lookup only logs
//! a warning.

use chrono::Utc;
use tourforge_core::job::{JobStatus, TourResult};
use tourforge_marble::api::MarbleApi;
use tourforge_marble::schema;

use crate::error::WorkflowError;

#[derive(Debug, Clone)]
pub struct ResolveOptions {
    pub viewer_base_url: String,
    /// Look up the canonical viewer URL via `GET /worlds/{id}`.
    pub enrich: bool,
}

/// `<viewer_base>/worlds/<world_id>`.
pub fn default_view_url(viewer_base_url: &str, world_id: &str) -> String {
    format!("{}/worlds/{world_id}", viewer_base_url.trim_end_matches('/'))
}

/// World id of a successfully finished operation.
pub fn world_id_of(status: &JobStatus) -> Result<String, WorkflowError> {
    if !status.done {
        return Err(WorkflowError::Validation(
            "Operation has not finished yet".to_string(),
        ));
    }
    if let Some(vendor_error) = status.error.clone().filter(|_| status.is_failure()) {
        return Err(WorkflowError::GenerationFailed { vendor_error });
    }

    let response = status
        .response
        .as_ref()
        .ok_or_else(|| WorkflowError::MalformedVendorResponse {
            context: "operation result",
            reason: "finished operation has no response".to_string(),
            body: serde_json::to_string(status).unwrap_or_default(),
        })?;

    Ok(schema::parse_world_id(response)?)
}

/// Build the tour for a finished operation.
pub async fn resolve(
    api: &MarbleApi,
    status: &JobStatus,
    display_name: &str,
    options: &ResolveOptions,
) -> Result<TourResult, WorkflowError> {
    let world_id = world_id_of(status)?;

    let mut view_url = default_view_url(&options.viewer_base_url, &world_id);
    if options.enrich {
        if let Some(canonical) = lookup_view_url(api, &world_id).await {
            view_url = canonical;
        }
    }

    tracing::info!(world_id = %world_id, view_url = %view_url, "Tour resolved");
    Ok(TourResult {
        world_id,
        view_url,
        display_name: display_name.to_string(),
        created_at: Utc::now(),
    })
}

/// Canonical viewer URL from world metadata, if the lookup succeeds and
/// the metadata carries one.
pub async fn lookup_view_url(api: &MarbleApi, world_id: &str) -> Option<String> {
    match api.get_world(world_id).await {
        Ok(world) => {
            let url = schema::parse_viewer_url(&world);
            if url.is_none() {
                tracing::debug!(world_id, "World metadata has no viewer URL");
            }
            url
        }
        Err(e) => {
            tracing::warn!(
                world_id,
                error = %e,
                "World metadata lookup failed, using default viewer URL",
            );
            None
        }
    }
}
