use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::info;

use super::strategy::{DrainReport, DrainStrategy, FixedRateDrain};
use crate::audit::AuditSink;
use crate::session::SessionTable;

/// Gateway shutdown progression driven by the drain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownState {
    Running,
    DrainRequested,
    Draining,
    Stopped,
}

impl fmt::Display for ShutdownState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ShutdownState::Running => "running",
            ShutdownState::DrainRequested => "drain requested",
            ShutdownState::Draining => "draining",
            ShutdownState::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

/// Triggers and tracks the graceful drain of the session table
#[derive(Clone)]
pub struct DrainCoordinator {
    inner: Arc<DrainCoordinatorInner>,
}

struct DrainCoordinatorInner {
    table: Arc<SessionTable>,
    audit: Arc<dyn AuditSink>,
    strategy: Arc<dyn DrainStrategy>,
    state: watch::Sender<ShutdownState>,
}

impl DrainCoordinator {
    pub fn new(
        table: Arc<SessionTable>,
        audit: Arc<dyn AuditSink>,
        strategy: Arc<dyn DrainStrategy>,
    ) -> Self {
        let (state, _) = watch::channel(ShutdownState::Running);
        Self {
            inner: Arc::new(DrainCoordinatorInner {
                table,
                audit,
                strategy,
                state,
            }),
        }
    }

    /// Coordinator using [`FixedRateDrain`]
    pub fn fixed_rate(
        table: Arc<SessionTable>,
        audit: Arc<dyn AuditSink>,
        rate: usize,
        interval: Duration,
    ) -> Self {
        Self::new(table, audit, Arc::new(FixedRateDrain::new(rate, interval)))
    }

    pub fn state(&self) -> ShutdownState {
        *self.inner.state.borrow()
    }

    /// Watch shutdown state changes
    pub fn subscribe(&self) -> watch::Receiver<ShutdownState> {
        self.inner.state.subscribe()
    }

    /// Request a drain and start it in the background.
    ///
    /// Returns `false` when a drain was already requested; in that case
    /// nothing new is started. Must be called within a Tokio runtime.
    pub fn request(&self) -> bool {
        if !self.begin() {
            info!("Graceful drain already {}", self.state());
            return false;
        }

        let coordinator = self.clone();
        tokio::spawn(async move {
            coordinator.run().await;
        });
        true
    }

    /// Request a drain and run it on the current task.
    ///
    /// Returns `None` without touching the table when a drain was already
    /// requested.
    pub async fn drain_now(&self) -> Option<DrainReport> {
        if !self.begin() {
            info!("Graceful drain already {}", self.state());
            return None;
        }
        Some(self.run().await)
    }

    /// `Running -> DrainRequested`; false from any other state
    fn begin(&self) -> bool {
        let requested = self.inner.state.send_if_modified(|state| {
            if *state == ShutdownState::Running {
                *state = ShutdownState::DrainRequested;
                true
            } else {
                false
            }
        });
        if requested {
            info!("Graceful drain requested");
        }
        requested
    }

    /// Only entered after a successful `begin`
    async fn run(&self) -> DrainReport {
        self.inner.state.send_replace(ShutdownState::Draining);
        info!(
            "Graceful drain started with {} active sessions",
            self.inner.table.size()
        );

        let report = self
            .inner
            .strategy
            .drain(&self.inner.table, self.inner.audit.as_ref())
            .await;

        self.inner.state.send_replace(ShutdownState::Stopped);
        info!("Graceful drain complete, gateway stopped");
        report
    }

    /// Wait until the state reaches `target` or a later stage
    pub async fn wait_for(&self, target: ShutdownState) {
        let mut rx = self.subscribe();
        // The sender lives as long as `self`, so this cannot fail
        let _ = rx.wait_for(|state| stage(*state) >= stage(target)).await;
    }
}

fn stage(state: ShutdownState) -> u8 {
    match state {
        ShutdownState::Running => 0,
        ShutdownState::DrainRequested => 1,
        ShutdownState::Draining => 2,
        ShutdownState::Stopped => 3,
    }
}

impl fmt::Debug for DrainCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrainCoordinator")
            .field("state", &self.state())
            .field("strategy", &self.inner.strategy)
            .finish()
    }
}
