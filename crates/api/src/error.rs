use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tourforge_core::error::CoreError;
use tourforge_pipeline::WorkflowError;

/// Application-level error type for HTTP handlers.
///
/// Implements [`IntoResponse`] to produce `{ "error", "code" }` bodies.
/// Vendor failures map to 502 with the vendor status and body in the
/// message.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core_error(core),
            AppError::Workflow(err) => classify_workflow_error(err),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::MissingCredentials(msg) | CoreError::Config(msg) => internal(msg),
    }
}

fn classify_workflow_error(err: &WorkflowError) -> (StatusCode, &'static str, String) {
    match err {
        WorkflowError::Validation(msg) => {
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
        }
        WorkflowError::UploadFailed { .. }
        | WorkflowError::SubmissionFailed { .. }
        | WorkflowError::StatusQueryFailed { .. } => {
            tracing::warn!(error = %err, "Vendor request rejected");
            (StatusCode::BAD_GATEWAY, "VENDOR_ERROR", err.to_string())
        }
        WorkflowError::GenerationFailed { .. } => {
            (StatusCode::BAD_GATEWAY, "GENERATION_FAILED", err.to_string())
        }
        WorkflowError::MalformedVendorResponse { body, .. } => {
            tracing::warn!(error = %err, body = %body, "Malformed vendor response");
            (StatusCode::BAD_GATEWAY, "MALFORMED_VENDOR_RESPONSE", err.to_string())
        }
        WorkflowError::Transport(_) => {
            tracing::warn!(error = %err, "Vendor unreachable");
            (StatusCode::BAD_GATEWAY, "VENDOR_UNREACHABLE", err.to_string())
        }
        WorkflowError::GenerationTimedOut { .. } => {
            (StatusCode::GATEWAY_TIMEOUT, "GENERATION_TIMEOUT", err.to_string())
        }
        WorkflowError::Cancelled { .. } => {
            (StatusCode::SERVICE_UNAVAILABLE, "CANCELLED", err.to_string())
        }
        WorkflowError::MissingCredentials(msg) => internal(msg),
        WorkflowError::Io(_) | WorkflowError::Serialization(_) => internal(&err.to_string()),
    }
}

fn internal(msg: &str) -> (StatusCode, &'static str, String) {
    tracing::error!(error = %msg, "Internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
