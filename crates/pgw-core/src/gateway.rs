//! Process-level wiring of the gateway components
//!
//! [`Gateway::start`] performs every fallible startup step (audit log,
//! sockets) and [`Gateway::run`] drives the tasks until a termination
//! signal arrives or a requested drain completes.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::api::{ApiState, ControlPlane};
use crate::audit::{AuditSink, CsvAuditSink};
use crate::config::ServerConfig;
use crate::drain::{DrainCoordinator, ShutdownState};
use crate::error::Result;
use crate::session::{ExpiryReaper, SessionTable};
use crate::transport::RequestServer;

/// Why the gateway stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownCause {
    /// Termination signal or external trigger
    Signal,
    /// `/stop` drain ran to completion
    Drained,
}

/// A fully bound gateway, ready to run
#[derive(Debug)]
pub struct Gateway {
    table: Arc<SessionTable>,
    drain: DrainCoordinator,
    udp: RequestServer,
    api: ControlPlane,
    reaper: ExpiryReaper,
}

impl Gateway {
    /// Open the audit log and bind both sockets described by `config`
    pub async fn start(config: &ServerConfig) -> Result<Self> {
        let audit: Arc<dyn AuditSink> = Arc::new(CsvAuditSink::open(&config.cdr_file)?);
        Self::with_audit(config, audit).await
    }

    /// Like [`Gateway::start`] with a caller-provided audit sink
    pub async fn with_audit(config: &ServerConfig, audit: Arc<dyn AuditSink>) -> Result<Self> {
        config.validate()?;

        let table = Arc::new(SessionTable::new(config.admission_policy()));
        let drain = DrainCoordinator::fixed_rate(
            table.clone(),
            audit.clone(),
            config.graceful_shutdown_rate,
            config.drain_interval(),
        );

        let udp = RequestServer::bind(config.udp_addr()?, table.clone(), audit).await?;
        let api = ControlPlane::bind(
            config.http_addr()?,
            ApiState {
                table: table.clone(),
                drain: drain.clone(),
            },
        )
        .await?;
        let reaper = ExpiryReaper::new(table.clone(), config.sweep_interval());

        Ok(Self {
            table,
            drain,
            udp,
            api,
            reaper,
        })
    }

    pub fn table(&self) -> &Arc<SessionTable> {
        &self.table
    }

    pub fn drain(&self) -> &DrainCoordinator {
        &self.drain
    }

    pub fn udp_addr(&self) -> SocketAddr {
        self.udp.local_addr()
    }

    pub fn http_addr(&self) -> SocketAddr {
        self.api.local_addr()
    }

    /// Run until termination signal (SIGINT/SIGTERM) or a completed drain
    pub async fn run(self) -> Result<ShutdownCause> {
        self.run_until(shutdown_signal()).await
    }

    /// Run until `shutdown` resolves or a requested drain completes.
    ///
    /// On shutdown the request server is stopped first, then the control
    /// plane, then the reaper. When a drain is requested the request server
    /// is stopped right away so no new sessions are admitted while draining.
    pub async fn run_until<F>(self, shutdown: F) -> Result<ShutdownCause>
    where
        F: Future<Output = ()> + Send,
    {
        let udp_token = CancellationToken::new();
        let api_token = CancellationToken::new();
        let reaper_token = CancellationToken::new();

        let udp_task = tokio::spawn(self.udp.run(udp_token.clone()));
        let api_task = tokio::spawn(self.api.serve(api_token.clone()));
        let reaper_task = tokio::spawn(self.reaper.run(reaper_token.clone()));

        let drain = self.drain;
        let cause = tokio::select! {
            _ = shutdown => ShutdownCause::Signal,
            _ = drain.wait_for(ShutdownState::DrainRequested) => {
                info!("Drain requested, stopping UDP server");
                udp_token.cancel();
                drain.wait_for(ShutdownState::Stopped).await;
                ShutdownCause::Drained
            }
        };

        info!("Shutting down gateway ({:?})", cause);

        udp_token.cancel();
        join("UDP server", udp_task).await;

        api_token.cancel();
        match api_task.await {
            Ok(Err(e)) => error!("HTTP server error: {}", e),
            Err(e) => error!("HTTP server task failed: {}", e),
            Ok(Ok(())) => {}
        }

        reaper_token.cancel();
        join("expiry reaper", reaper_task).await;

        info!(
            "Gateway stopped with {} active sessions",
            self.table.size()
        );
        Ok(cause)
    }
}

async fn join(name: &str, task: JoinHandle<()>) {
    if let Err(e) = task.await {
        error!("{} task failed: {}", name, e);
    }
}

/// Resolves on SIGINT, or SIGTERM on unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
