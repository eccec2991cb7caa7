//! Periodic removal of expired sessions

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::SessionTable;

/// Default period between sweeps
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5);

/// Owner loop for [`SessionTable::sweep_expired`].
///
/// Expired sessions are removed silently with respect to the audit log;
/// only the per-sweep count is logged.
#[derive(Debug, Clone)]
pub struct ExpiryReaper {
    table: Arc<SessionTable>,
    period: Duration,
}

impl ExpiryReaper {
    pub fn new(table: Arc<SessionTable>, period: Duration) -> Self {
        Self { table, period }
    }

    /// Run a single sweep against the current time
    pub fn sweep_now(&self) -> usize {
        self.table.sweep_expired(Instant::now())
    }

    /// Sweep every `period` until `token` is cancelled
    pub async fn run(self, token: CancellationToken) {
        info!(
            "Expiry reaper started, interval: {:?}, session timeout: {:?}",
            self.period,
            self.table.policy().session_timeout
        );

        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => {
                    let removed = self.sweep_now();
                    debug!("Expiry sweep done, removed: {}, active: {}", removed, self.table.size());
                }
            }
        }

        info!("Expiry reaper stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::AdmissionPolicy;

    #[tokio::test]
    async fn test_reaper_sweeps_and_stops_on_cancel() {
        let table = Arc::new(SessionTable::new(AdmissionPolicy::new(
            Vec::<String>::new(),
            10,
            Duration::from_millis(50),
        )));
        table.try_create("111111111111111");

        let token = CancellationToken::new();
        let reaper = ExpiryReaper::new(table.clone(), Duration::from_millis(20));
        let handle = tokio::spawn(reaper.run(token.clone()));

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(!table.is_active("111111111111111"));

        token.cancel();
        handle.await.unwrap();
    }
}
