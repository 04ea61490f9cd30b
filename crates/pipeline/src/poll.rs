//! Job poller.
//!
//! Queries the operation at a fixed interval until it finishes, the
//! deadline passes, or the run is cancelled. Both cancellation and the
//! deadline interrupt the sleep and an in-flight status request.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tourforge_core::config::{VendorConfig, DEFAULT_POLL_INTERVAL_SECS, DEFAULT_POLL_TIMEOUT_SECS};
use tourforge_core::job::{JobHandle, JobStatus};
use tourforge_events::WorkflowEventKind;
use tourforge_marble::api::MarbleApi;

use crate::error::WorkflowError;
use crate::report::Reporter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Pause between status queries.
    pub interval: Duration,
    /// Total time allowed, measured from the first query.
    pub timeout: Duration,
}

impl PollConfig {
    pub fn from_vendor(config: &VendorConfig) -> Self {
        Self {
            interval: config.poll_interval,
            timeout: config.poll_timeout,
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            timeout: Duration::from_secs(DEFAULT_POLL_TIMEOUT_SECS),
        }
    }
}

/// Poll `handle` until it reaches a terminal state.
///
/// Returns the final status of a successful job. A job that finished with
/// a vendor error becomes [`WorkflowError::GenerationFailed`]. No request
/// is issued once the deadline has passed, and a reply that arrives after
/// it is discarded.
pub async fn poll_until_done(
    api: &MarbleApi,
    handle: &JobHandle,
    config: &PollConfig,
    reporter: Reporter<'_>,
    cancel: &CancellationToken,
) -> Result<JobStatus, WorkflowError> {
    let operation_id = handle.operation_id.as_str();
    let started = Instant::now();
    let deadline = started + config.timeout;
    let mut attempt: u32 = 0;

    loop {
        if cancel.is_cancelled() {
            return Err(cancelled(operation_id));
        }
        attempt += 1;

        let status = tokio::select! {
            _ = cancel.cancelled() => return Err(cancelled(operation_id)),
            _ = tokio::time::sleep_until(deadline) => {
                return Err(timed_out(operation_id, started.elapsed()));
            }
            result = api.get_operation(operation_id) => result.map_err(|e| {
                WorkflowError::from_vendor(e, |vendor_status, vendor_body| {
                    WorkflowError::StatusQueryFailed {
                        operation_id: operation_id.to_string(),
                        vendor_status,
                        vendor_body,
                    }
                })
            })?,
        };

        tracing::debug!(
            operation_id,
            attempt,
            done = status.done,
            progress = ?status.progress_percent,
            "Polled operation",
        );
        reporter.emit(WorkflowEventKind::Progress {
            operation_id: operation_id.to_string(),
            percent: status.progress_percent,
        });

        if status.done {
            if let Some(vendor_error) = status.error.clone().filter(|_| status.is_failure()) {
                tracing::warn!(operation_id, error = %vendor_error, "Generation failed");
                return Err(WorkflowError::GenerationFailed { vendor_error });
            }
            return Ok(status);
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(timed_out(operation_id, now - started));
        }

        let wait = config.interval.min(deadline - now);
        tokio::select! {
            _ = cancel.cancelled() => return Err(cancelled(operation_id)),
            _ = tokio::time::sleep(wait) => {}
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(timed_out(operation_id, now - started));
        }
    }
}

fn cancelled(operation_id: &str) -> WorkflowError {
    tracing::info!(operation_id, "Polling cancelled");
    WorkflowError::Cancelled {
        operation_id: operation_id.to_string(),
    }
}

fn timed_out(operation_id: &str, elapsed: Duration) -> WorkflowError {
    tracing::warn!(operation_id, elapsed_secs = elapsed.as_secs(), "Generation timed out");
    WorkflowError::GenerationTimedOut {
        operation_id: operation_id.to_string(),
        elapsed,
    }
}
