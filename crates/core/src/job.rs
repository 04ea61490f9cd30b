//! Vendor job handles, status snapshots and finished tour results.

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Opaque handle for a submitted generation job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobHandle {
    pub operation_id: String,
}

impl JobHandle {
    pub fn new(operation_id: impl Into<String>) -> Self {
        Self {
            operation_id: operation_id.into(),
        }
    }
}

/// One snapshot of a vendor operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobStatus {
    pub done: bool,
    /// Completion percentage (0-100), when the vendor reports it.
    pub progress_percent: Option<u8>,
    /// Structured vendor error, present only on failed operations.
    pub error: Option<serde_json::Value>,
    /// Raw result payload, present once the operation succeeded.
    pub response: Option<serde_json::Value>,
}

impl JobStatus {
    /// Finished without a vendor error.
    pub fn is_success(&self) -> bool {
        self.done && !self.has_error()
    }

    /// Finished with a vendor error.
    pub fn is_failure(&self) -> bool {
        self.done && self.has_error()
    }

    fn has_error(&self) -> bool {
        matches!(&self.error, Some(value) if !value.is_null())
    }
}

/// Clamp a raw vendor progress value into `0..=100`.
pub fn clamp_progress(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, 100.0) as u8
}

/// A finished, shareable 3D tour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TourResult {
    pub world_id: String,
    pub view_url: String,
    pub display_name: String,
    pub created_at: Timestamp,
}
