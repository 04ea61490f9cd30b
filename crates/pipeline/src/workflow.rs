//! End-to-end generation workflow.
//!
//! [`JobWorkflow::run`] drives one request through
//! `Idle -> Uploading -> Submitting -> Polling -> Resolved` and publishes
//! a [`WorkflowEventKind`] for every step plus exactly one terminal event.
//! [`JobWorkflow::start`] and [`JobWorkflow::complete`] run the two
//! halves separately, e.g. when the submitting and polling callers differ.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tourforge_core::config::VendorConfig;
use tourforge_core::job::{JobHandle, TourResult};
use tourforge_core::request::GenerationRequest;
use tourforge_events::{EventBus, WorkflowEventKind, WorkflowStage};
use tourforge_marble::api::MarbleApi;

use crate::error::WorkflowError;
use crate::poll::{poll_until_done, PollConfig};
use crate::report::Reporter;
use crate::resolve::{resolve, ResolveOptions};
use crate::submit::submit;
use crate::upload::MediaUploader;

#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    pub poll: PollConfig,
    pub resolve: ResolveOptions,
}

impl WorkflowConfig {
    /// Vendor timings and viewer base, with metadata enrichment on.
    pub fn from_vendor(config: &VendorConfig) -> Self {
        Self {
            poll: PollConfig::from_vendor(config),
            resolve: ResolveOptions {
                viewer_base_url: config.viewer_base_url.clone(),
                enrich: true,
            },
        }
    }

    pub fn with_enrichment(mut self, enrich: bool) -> Self {
        self.resolve.enrich = enrich;
        self
    }
}

/// Runs generation requests against one vendor account.
///
/// Shareable across tasks; each [`run`](Self::run) is independent.
pub struct JobWorkflow {
    api: Arc<MarbleApi>,
    config: WorkflowConfig,
    event_bus: Option<Arc<EventBus>>,
}

impl JobWorkflow {
    pub fn new(api: Arc<MarbleApi>, config: WorkflowConfig) -> Self {
        Self {
            api,
            config,
            event_bus: None,
        }
    }

    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Upload, submit, poll and resolve one request.
    ///
    /// `request` is not modified; uploads are applied to a copy. The
    /// token only has an effect while the job is being polled.
    pub async fn run(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<TourResult, WorkflowError> {
        let handle = self.start(request).await?;
        self.complete(&handle, &request.display_name, cancel).await
    }

    /// Upload pending media and submit the request.
    ///
    /// Publishes `Failed` when either step fails; on success the run
    /// continues with [`complete`](Self::complete).
    pub async fn start(&self, request: &GenerationRequest) -> Result<JobHandle, WorkflowError> {
        let reporter = Reporter::new(self.event_bus.as_deref(), &request.display_name);
        let mut stage = WorkflowStage::Idle;

        let outcome = self.upload_and_submit(request, reporter, &mut stage).await;
        let handle = outcome.inspect_err(|e| fail(e, reporter, &mut stage))?;

        reporter.emit(WorkflowEventKind::Submitted {
            operation_id: handle.operation_id.clone(),
        });
        Ok(handle)
    }

    /// Poll a submitted job and resolve its tour.
    ///
    /// Publishes exactly one terminal event.
    pub async fn complete(
        &self,
        handle: &JobHandle,
        display_name: &str,
        cancel: &CancellationToken,
    ) -> Result<TourResult, WorkflowError> {
        let reporter = Reporter::new(self.event_bus.as_deref(), display_name);
        let mut stage = WorkflowStage::Submitting;

        advance(&mut stage, WorkflowStage::Polling);
        let outcome = self.poll_and_resolve(handle, display_name, reporter, cancel).await;
        let result = outcome.inspect_err(|e| fail(e, reporter, &mut stage))?;

        advance(&mut stage, WorkflowStage::Resolved);
        reporter.emit(WorkflowEventKind::Resolved {
            result: result.clone(),
        });
        Ok(result)
    }

    async fn upload_and_submit(
        &self,
        request: &GenerationRequest,
        reporter: Reporter<'_>,
        stage: &mut WorkflowStage,
    ) -> Result<JobHandle, WorkflowError> {
        request.validate()?;

        let mut prepared = request.clone();
        if prepared.prompt.pending_uploads() > 0 {
            advance(stage, WorkflowStage::Uploading);
            MediaUploader::new(&self.api)
                .with_reporter(reporter)
                .resolve_uploads(&mut prepared.prompt)
                .await?;
        }

        advance(stage, WorkflowStage::Submitting);
        submit(&self.api, &prepared).await
    }

    async fn poll_and_resolve(
        &self,
        handle: &JobHandle,
        display_name: &str,
        reporter: Reporter<'_>,
        cancel: &CancellationToken,
    ) -> Result<TourResult, WorkflowError> {
        let status = poll_until_done(&self.api, handle, &self.config.poll, reporter, cancel).await?;
        resolve(&self.api, &status, display_name, &self.config.resolve).await
    }
}

/// Publish the terminal event for a failed run.
fn fail(err: &WorkflowError, reporter: Reporter<'_>, stage: &mut WorkflowStage) {
    let kind = match err {
        WorkflowError::GenerationTimedOut { operation_id, .. } => WorkflowEventKind::TimedOut {
            operation_id: operation_id.clone(),
        },
        WorkflowError::Cancelled { operation_id } => WorkflowEventKind::Cancelled {
            operation_id: operation_id.clone(),
        },
        e => WorkflowEventKind::Failed {
            error: e.to_string(),
        },
    };

    advance(stage, err.stage());
    tracing::error!(error = %err, stage = ?stage, "Generation run failed");
    reporter.emit(kind);
}

fn advance(stage: &mut WorkflowStage, next: WorkflowStage) {
    if !stage.can_transition_to(next) {
        tracing::warn!(from = ?stage, to = ?next, "Unexpected workflow transition");
    }
    tracing::debug!(from = ?stage, to = ?next, "Workflow stage");
    *stage = next;
}
