//! Audit trail (CDR) for subscriber-visible session transitions
//!
//! Components record through the [`AuditSink`] trait. Two backends are
//! provided: [`CsvAuditSink`] writes the CSV call detail record file and
//! [`MemoryAuditSink`] keeps events in memory.

pub mod file;
pub mod memory;
pub mod types;

pub use file::CsvAuditSink;
pub use memory::MemoryAuditSink;
pub use types::{AuditAction, AuditEvent};

use tracing::error;

use crate::error::Result;

/// Append-only event recorder.
///
/// Implementations must be safe to call from several tasks at once and
/// must write each event as one indivisible record.
pub trait AuditSink: Send + Sync {
    /// Append one event
    fn record(&self, event: &AuditEvent) -> Result<()>;
}

/// Record `action` for `imsi` now, logging instead of propagating failures.
///
/// Audit write failures never interrupt request handling or draining.
pub fn emit(sink: &dyn AuditSink, imsi: &str, action: AuditAction) {
    let event = AuditEvent::now(imsi, action);
    if let Err(e) = sink.record(&event) {
        error!("Failed to record audit event {} for IMSI {}: {}", action, imsi, e);
    }
}
