//! In-memory audit sink

use parking_lot::Mutex;

use super::types::{AuditAction, AuditEvent};
use super::AuditSink;
use crate::error::Result;

/// Keeps every recorded event in memory
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all events recorded so far
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().clone()
    }

    /// Number of recorded events with `action`
    pub fn count(&self, action: AuditAction) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| e.action == action)
            .count()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: &AuditEvent) -> Result<()> {
        self.events.lock().push(event.clone());
        Ok(())
    }
}
