//! Workflow stage model and in-process event bus.
//!
//! Each generation run publishes [`WorkflowEvent`]s so a CLI progress
//! line or a web client can follow it without polling the workflow.

pub mod bus;
pub mod stage;

pub use bus::{EventBus, WorkflowEvent, WorkflowEventKind};
pub use stage::WorkflowStage;
