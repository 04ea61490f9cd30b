//! Job submitter.

use tourforge_core::job::JobHandle;
use tourforge_core::request::GenerationRequest;
use tourforge_marble::api::MarbleApi;
use tourforge_marble::payload::build_generate_payload;

use crate::error::WorkflowError;

/// Start a generation job for a fully uploaded request.
///
/// The request is validated and rejected with
/// [`WorkflowError::Validation`] before any network call when it is
/// invalid or still holds pending uploads.
pub async fn submit(api: &MarbleApi, request: &GenerationRequest) -> Result<JobHandle, WorkflowError> {
    let body = build_generate_payload(request)?;

    let operation_id = api.generate_world(&body).await.map_err(|e| {
        WorkflowError::from_vendor(e, |vendor_status, vendor_body| {
            WorkflowError::SubmissionFailed {
                vendor_status,
                vendor_body,
            }
        })
    })?;

    tracing::info!(
        operation_id = %operation_id,
        display_name = %request.display_name,
        kind = request.prompt.kind(),
        model = request.model_tier.model_id(),
        "Generation submitted",
    );
    Ok(JobHandle::new(operation_id))
}
