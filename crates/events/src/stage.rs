//! Lifecycle of a single generation run.
//!
//! ```text
//! Idle -> Uploading (0..N) -> Submitting -> Polling -> Resolved
//!                                                   -> Failed
//!                                                   -> TimedOut
//!                                                   -> Cancelled
//! ```
//!
//! Any non-terminal stage may also move straight to `Failed`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStage {
    Idle,
    Uploading,
    Submitting,
    Polling,
    Resolved,
    Failed,
    TimedOut,
    Cancelled,
}

impl WorkflowStage {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            WorkflowStage::Resolved
                | WorkflowStage::Failed
                | WorkflowStage::TimedOut
                | WorkflowStage::Cancelled
        )
    }

    /// Whether `next` is a legal successor of `self`.
    pub fn can_transition_to(self, next: WorkflowStage) -> bool {
        use WorkflowStage::*;

        if self.is_terminal() {
            return false;
        }
        if next == Failed {
            return true;
        }
        match (self, next) {
            (Idle, Uploading | Submitting) => true,
            (Uploading, Uploading | Submitting) => true,
            (Submitting, Polling) => true,
            (Polling, Polling | Resolved | TimedOut | Cancelled) => true,
            _ => false,
        }
    }
}
