//! Publishing workflow events for one run.

use tourforge_events::{EventBus, WorkflowEvent, WorkflowEventKind};

/// Tags events with the run's display name and forwards them to an
/// optional [`EventBus`]. Without a bus, events are dropped.
#[derive(Clone, Copy)]
pub struct Reporter<'a> {
    bus: Option<&'a EventBus>,
    display_name: &'a str,
}

impl<'a> Reporter<'a> {
    pub fn new(bus: Option<&'a EventBus>, display_name: &'a str) -> Self {
        Self { bus, display_name }
    }

    pub fn silent() -> Reporter<'static> {
        Reporter {
            bus: None,
            display_name: "",
        }
    }

    pub fn emit(&self, kind: WorkflowEventKind) {
        if let Some(bus) = self.bus {
            bus.publish(WorkflowEvent::new(self.display_name, kind));
        }
    }
}
