//! Event publisher adapters.

use crate::events::LedgerEvent;
use crate::ports::outbound::{EventPublisher, PublishError};
use parking_lot::Mutex;

/// No-op publisher for hosts that do not consume events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpPublisher;

impl EventPublisher for NoOpPublisher {
    fn publish(&self, _event: &LedgerEvent) -> Result<(), PublishError> {
        Ok(())
    }
}

/// Publisher that keeps every event in memory until drained.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<LedgerEvent>>,
}

impl RecordingPublisher {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes all recorded events, oldest first.
    pub fn drain(&self) -> Vec<LedgerEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Copies the recorded events without clearing them.
    #[must_use]
    pub fn snapshot(&self) -> Vec<LedgerEvent> {
        self.events.lock().clone()
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish(&self, event: &LedgerEvent) -> Result<(), PublishError> {
        self.events.lock().push(event.clone());
        Ok(())
    }
}

impl<P: EventPublisher + ?Sized> EventPublisher for std::sync::Arc<P> {
    fn publish(&self, event: &LedgerEvent) -> Result<(), PublishError> {
        (**self).publish(event)
    }
}
