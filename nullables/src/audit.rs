//! Nullable audit sink: record events instead of shipping them.

use kyc_verification::{AuditAction, AuditError, AuditEvent, AuditSink};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// An audit sink that keeps every event in memory.
///
/// Can be switched to fail, to check that sink outages never break the
/// operation being audited.
#[derive(Debug, Default)]
pub struct NullAuditSink {
    events: Mutex<Vec<AuditEvent>>,
    failing: AtomicBool,
}

impl NullAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that rejects every event.
    pub fn failing() -> Self {
        let sink = Self::default();
        sink.set_failing(true);
        sink
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// All recorded events (for assertions).
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Recorded actions, in order.
    pub fn actions(&self) -> Vec<AuditAction> {
        self.events.lock().unwrap().iter().map(|e| e.action).collect()
    }
}

impl AuditSink for NullAuditSink {
    fn record(&self, event: &AuditEvent) -> Result<(), AuditError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AuditError::Unavailable("null sink set to fail".into()));
        }
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}
