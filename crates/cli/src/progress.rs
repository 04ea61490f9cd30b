//! Logs workflow events as they arrive.

use tokio::sync::broadcast::{self, error::RecvError};
use tourforge_events::{WorkflowEvent, WorkflowEventKind};

/// Consume events until the bus is dropped.
pub async fn log_events(mut rx: broadcast::Receiver<WorkflowEvent>) {
    loop {
        match rx.recv().await {
            Ok(event) => log_event(&event),
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "Progress display fell behind");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

pub fn log_event(event: &WorkflowEvent) {
    match &event.kind {
        WorkflowEventKind::UploadStarted { filename } => {
            tracing::info!(filename = %filename, "Uploading");
        }
        WorkflowEventKind::UploadCompleted { filename, media_id } => {
            tracing::info!(filename = %filename, media_id = %media_id, "Uploaded");
        }
        WorkflowEventKind::Submitted { operation_id } => {
            tracing::info!(operation_id = %operation_id, "Generation started");
        }
        WorkflowEventKind::Progress {
            operation_id,
            percent: Some(percent),
        } => {
            tracing::info!(operation_id = %operation_id, "Generating... {percent}%");
        }
        WorkflowEventKind::Progress { operation_id, .. } => {
            tracing::info!(operation_id = %operation_id, "Generating...");
        }
        WorkflowEventKind::Resolved { result } => {
            tracing::info!(world_id = %result.world_id, "Tour ready");
        }
        WorkflowEventKind::TimedOut { operation_id } => {
            tracing::warn!(operation_id = %operation_id, "Gave up waiting for the world");
        }
        WorkflowEventKind::Cancelled { operation_id } => {
            tracing::warn!(operation_id = %operation_id, "Cancelled");
        }
        WorkflowEventKind::Failed { .. } => {}
    }
}
