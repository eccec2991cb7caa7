//! Control-plane HTTP API
//!
//! - `GET /check_subscriber?imsi=<imsi>` answers `active` or `not active`
//! - `GET /stop` acknowledges immediately and starts the graceful drain

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::drain::DrainCoordinator;
use crate::error::{Error, Result};
use crate::session::SessionTable;

/// Body returned when the `imsi` query parameter is missing or empty
pub const MISSING_IMSI_BODY: &str = "Error: IMSI parameter is required";
/// Body returned by `/stop`
pub const SHUTDOWN_ACK_BODY: &str = "Initiating graceful shutdown...";

/// Shared state for the control-plane handlers
#[derive(Clone, Debug)]
pub struct ApiState {
    pub table: Arc<SessionTable>,
    pub drain: DrainCoordinator,
}

/// Build the control-plane router
pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/check_subscriber", get(check_subscriber))
        .route("/stop", get(stop))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn check_subscriber(
    State(state): State<ApiState>,
    Query(params): Query<Vec<(String, String)>>,
) -> (StatusCode, &'static str) {
    // Repeated parameters resolve to the first occurrence
    let first = params
        .iter()
        .find(|(name, _)| name == "imsi")
        .map(|(_, value)| value.as_str());

    let imsi = match first {
        Some(imsi) if !imsi.is_empty() => imsi,
        _ => {
            warn!("HTTP /check_subscriber: missing IMSI parameter");
            return (StatusCode::BAD_REQUEST, MISSING_IMSI_BODY);
        }
    };

    let status = if state.table.is_active(imsi) {
        "active"
    } else {
        "not active"
    };
    debug!("HTTP /check_subscriber: IMSI={} -> {}", imsi, status);

    (StatusCode::OK, status)
}

async fn stop(State(state): State<ApiState>) -> &'static str {
    info!("HTTP /stop received, initiating graceful shutdown");
    state.drain.request();
    SHUTDOWN_ACK_BODY
}

/// Bound control-plane HTTP server
#[derive(Debug)]
pub struct ControlPlane {
    listener: TcpListener,
    local_addr: SocketAddr,
    router: Router,
}

impl ControlPlane {
    /// Bind the listener. Failure here is a startup error.
    pub async fn bind(addr: SocketAddr, state: ApiState) -> Result<Self> {
        let listener = TcpListener::bind(addr).await.map_err(|e| Error::bind("HTTP", addr, e))?;
        let local_addr = listener.local_addr().map_err(|e| Error::bind("HTTP", addr, e))?;

        Ok(Self {
            listener,
            local_addr,
            router: create_router(state),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serve requests until `token` is cancelled; in-flight requests finish
    pub async fn serve(self, token: CancellationToken) -> Result<()> {
        info!("HTTP server listening on {}", self.local_addr);

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(async move { token.cancelled().await })
            .await?;

        info!("HTTP server stopped");
        Ok(())
    }
}
