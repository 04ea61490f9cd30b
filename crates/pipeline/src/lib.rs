//! The job workflow: upload, submit, poll, resolve.
//!
//! Each stage is usable on its own ([`upload`], [`submit`], [`poll`],
//! [`resolve`]); [`workflow::JobWorkflow`] chains them for one request
//! and publishes progress on an optional event bus. [`store`] persists
//! finished tours as JSON files.

pub mod error;
pub mod poll;
pub mod report;
pub mod resolve;
pub mod store;
pub mod submit;
pub mod upload;
pub mod workflow;

pub use error::WorkflowError;
pub use workflow::{JobWorkflow, WorkflowConfig};
