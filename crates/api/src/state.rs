use std::sync::Arc;

use tourforge_core::config::VendorConfig;
use tourforge_events::EventBus;
use tourforge_marble::api::{MarbleApi, MarbleApiError};
use tourforge_pipeline::{JobWorkflow, WorkflowConfig};

use crate::config::ServerConfig;
use crate::session::TourSession;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything lives behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Vendor client shared by every request.
    pub api: Arc<MarbleApi>,
    /// Workflow over the same client, publishing on `event_bus`.
    pub workflow: Arc<JobWorkflow>,
    /// Tours resolved since startup.
    pub tours: Arc<TourSession>,
    pub event_bus: Arc<EventBus>,
}

impl AppState {
    pub fn new(config: ServerConfig, vendor: &VendorConfig) -> Result<Self, MarbleApiError> {
        let api = Arc::new(MarbleApi::new(vendor)?);
        let event_bus = Arc::new(EventBus::default());
        let workflow = JobWorkflow::new(Arc::clone(&api), WorkflowConfig::from_vendor(vendor))
            .with_event_bus(Arc::clone(&event_bus));

        Ok(Self {
            config: Arc::new(config),
            api,
            workflow: Arc::new(workflow),
            tours: Arc::new(TourSession::new()),
            event_bus,
        })
    }
}
