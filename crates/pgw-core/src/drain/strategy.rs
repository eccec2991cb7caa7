//! Batch eviction strategies

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::audit::{self, AuditAction, AuditSink};
use crate::session::SessionTable;

/// Default pause between drain batches
pub const DEFAULT_DRAIN_INTERVAL: Duration = Duration::from_secs(1);

/// Summary of a completed drain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Number of batches taken
    pub batches: usize,
    /// Sessions actually removed by the drain
    pub removed: usize,
}

/// Empties a [`SessionTable`], recording a `graceful_remove` event for
/// every session it deletes.
///
/// Implementations run to completion and must not hold the table lock
/// while waiting between batches.
#[async_trait]
pub trait DrainStrategy: Send + Sync + fmt::Debug {
    async fn drain(&self, table: &SessionTable, audit: &dyn AuditSink) -> DrainReport;
}

/// Removes at most `rate` sessions per batch with a fixed pause between
/// batches.
#[derive(Debug, Clone)]
pub struct FixedRateDrain {
    rate: usize,
    interval: Duration,
}

impl FixedRateDrain {
    /// A `rate` of zero is raised to one so the drain always progresses
    pub fn new(rate: usize, interval: Duration) -> Self {
        Self {
            rate: rate.max(1),
            interval,
        }
    }

    pub fn rate(&self) -> usize {
        self.rate
    }
}

#[async_trait]
impl DrainStrategy for FixedRateDrain {
    async fn drain(&self, table: &SessionTable, audit: &dyn AuditSink) -> DrainReport {
        let mut report = DrainReport::default();

        info!(
            "Draining {} sessions at {} per {:?}",
            table.size(),
            self.rate,
            self.interval
        );

        while !table.is_empty() {
            let batch = table.snapshot_keys(self.rate);
            report.batches += 1;

            let mut removed = 0;
            for imsi in &batch {
                // Another context may have removed it since the snapshot
                if table.remove(imsi) {
                    audit::emit(audit, imsi, AuditAction::GracefulRemove);
                    removed += 1;
                }
            }
            report.removed += removed;

            debug!(
                "Drain batch {} removed {} sessions, {} remaining",
                report.batches,
                removed,
                table.size()
            );

            if table.is_empty() {
                break;
            }
            tokio::time::sleep(self.interval).await;
        }

        info!(
            "Drain finished: {} sessions removed in {} batches",
            report.removed, report.batches
        );
        report
    }
}
