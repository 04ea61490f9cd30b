use std::time::Duration;

use serde_json::Value;
use tourforge_core::error::CoreError;
use tourforge_events::WorkflowStage;
use tourforge_marble::api::MarbleApiError;
use tourforge_marble::schema::SchemaError;

/// Everything that can end a generation run.
///
/// Vendor failures keep the vendor's status code and body verbatim.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Upload of '{filename}' failed ({vendor_status}): {vendor_body}")]
    UploadFailed {
        filename: String,
        vendor_status: u16,
        vendor_body: String,
    },

    #[error("Generation request rejected ({vendor_status}): {vendor_body}")]
    SubmissionFailed {
        vendor_status: u16,
        vendor_body: String,
    },

    #[error("Status query for {operation_id} failed ({vendor_status}): {vendor_body}")]
    StatusQueryFailed {
        operation_id: String,
        vendor_status: u16,
        vendor_body: String,
    },

    /// The job finished with a vendor-reported error.
    #[error("Generation failed: {vendor_error}")]
    GenerationFailed { vendor_error: Value },

    #[error("Generation {operation_id} did not finish within {elapsed:?}")]
    GenerationTimedOut {
        operation_id: String,
        elapsed: Duration,
    },

    #[error("Malformed vendor response ({context}): {reason}")]
    MalformedVendorResponse {
        context: &'static str,
        reason: String,
        body: String,
    },

    #[error("Generation {operation_id} was cancelled")]
    Cancelled { operation_id: String },

    #[error("HTTP request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl WorkflowError {
    /// Map a client error, letting the caller decide what a non-2xx
    /// status means for its stage.
    pub fn from_vendor(
        err: MarbleApiError,
        on_status: impl FnOnce(u16, String) -> WorkflowError,
    ) -> Self {
        match err {
            MarbleApiError::ApiError { status, body } => on_status(status, body),
            MarbleApiError::Malformed(schema) => schema.into(),
            MarbleApiError::Request(e) => WorkflowError::Transport(e),
            e @ (MarbleApiError::InvalidId { .. } | MarbleApiError::InvalidBaseUrl(_)) => {
                WorkflowError::Validation(e.to_string())
            }
        }
    }

    /// Vendor HTTP status carried by the error, if any.
    pub fn vendor_status(&self) -> Option<u16> {
        match self {
            WorkflowError::UploadFailed { vendor_status, .. }
            | WorkflowError::SubmissionFailed { vendor_status, .. }
            | WorkflowError::StatusQueryFailed { vendor_status, .. } => Some(*vendor_status),
            _ => None,
        }
    }

    /// Terminal stage a run ends in when it fails with this error.
    pub fn stage(&self) -> WorkflowStage {
        match self {
            WorkflowError::GenerationTimedOut { .. } => WorkflowStage::TimedOut,
            WorkflowError::Cancelled { .. } => WorkflowStage::Cancelled,
            _ => WorkflowStage::Failed,
        }
    }
}

impl From<CoreError> for WorkflowError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) | CoreError::Config(msg) => WorkflowError::Validation(msg),
            CoreError::MissingCredentials(msg) => WorkflowError::MissingCredentials(msg),
        }
    }
}

impl From<SchemaError> for WorkflowError {
    fn from(err: SchemaError) -> Self {
        WorkflowError::MalformedVendorResponse {
            context: err.context,
            reason: err.reason,
            body: err.body,
        }
    }
}
