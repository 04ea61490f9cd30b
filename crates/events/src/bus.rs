//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] fans [`WorkflowEvent`]s out to any number of
//! subscribers. It is designed to be shared via `Arc<EventBus>`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use tourforge_core::job::TourResult;

use crate::stage::WorkflowStage;

// ---------------------------------------------------------------------------
// WorkflowEvent
// ---------------------------------------------------------------------------

/// What happened during a generation run.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkflowEventKind {
    /// A media upload is about to be sent.
    UploadStarted { filename: String },

    /// A media upload finished.
    UploadCompleted { filename: String, media_id: String },

    /// The generation request was accepted by the vendor.
    Submitted { operation_id: String },

    /// A status query returned a still-running or freshly finished job.
    Progress {
        operation_id: String,
        /// Completion percentage (0-100), when the vendor reports it.
        percent: Option<u8>,
    },

    /// The tour is ready.
    Resolved { result: TourResult },

    /// The run aborted with an error.
    Failed { error: String },

    /// The poll deadline elapsed before the job finished.
    TimedOut { operation_id: String },

    /// The run was cancelled while polling.
    Cancelled { operation_id: String },
}

impl WorkflowEventKind {
    /// Stage the run is in once this event has been published.
    pub fn stage(&self) -> WorkflowStage {
        match self {
            WorkflowEventKind::UploadStarted { .. } | WorkflowEventKind::UploadCompleted { .. } => {
                WorkflowStage::Uploading
            }
            WorkflowEventKind::Submitted { .. } | WorkflowEventKind::Progress { .. } => {
                WorkflowStage::Polling
            }
            WorkflowEventKind::Resolved { .. } => WorkflowStage::Resolved,
            WorkflowEventKind::Failed { .. } => WorkflowStage::Failed,
            WorkflowEventKind::TimedOut { .. } => WorkflowStage::TimedOut,
            WorkflowEventKind::Cancelled { .. } => WorkflowStage::Cancelled,
        }
    }
}

/// A workflow event tagged with the run it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowEvent {
    /// Display name of the run that emitted the event.
    pub display_name: String,

    #[serde(flatten)]
    pub kind: WorkflowEventKind,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl WorkflowEvent {
    pub fn new(display_name: impl Into<String>, kind: WorkflowEventKind) -> Self {
        Self {
            display_name: display_name.into(),
            kind,
            timestamp: Utc::now(),
        }
    }

    pub fn stage(&self) -> WorkflowStage {
        self.kind.stage()
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out event bus.
///
/// # Usage
///
/// ```rust
/// use tourforge_events::bus::{EventBus, WorkflowEvent, WorkflowEventKind};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(WorkflowEvent::new(
///     "12 Elm St",
///     WorkflowEventKind::Submitted { operation_id: "op_1".into() },
/// ));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<WorkflowEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, event: WorkflowEvent) {
        tracing::trace!(
            display_name = %event.display_name,
            stage = ?event.stage(),
            "Publishing workflow event",
        );
        // Ignore the SendError -- it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<WorkflowEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
