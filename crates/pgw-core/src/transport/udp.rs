use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::protocol::{decode_imsi, Reply, MAX_DATAGRAM_SIZE};
use crate::audit::{self, AuditSink};
use crate::error::{Error, Result};
use crate::session::SessionTable;

/// UDP request server admitting sessions on behalf of peers
pub struct RequestServer {
    socket: UdpSocket,
    local_addr: SocketAddr,
    table: Arc<SessionTable>,
    audit: Arc<dyn AuditSink>,
}

impl RequestServer {
    /// Bind the server socket. Failure here is a startup error.
    pub async fn bind(
        addr: SocketAddr,
        table: Arc<SessionTable>,
        audit: Arc<dyn AuditSink>,
    ) -> Result<Self> {
        let socket = UdpSocket::bind(addr).await.map_err(|e| Error::bind("UDP", addr, e))?;

        // Port 0 resolves to the real port here
        let local_addr = socket.local_addr().map_err(|e| Error::bind("UDP", addr, e))?;
        info!("UDP server created on {}", local_addr);

        Ok(Self {
            socket,
            local_addr,
            table,
            audit,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Admit `imsi`, record the audit event and return the reply to send
    pub fn handle_request(&self, imsi: &str) -> Reply {
        let outcome = self.table.try_create(imsi);
        audit::emit(self.audit.as_ref(), imsi, outcome.audit_action());
        Reply::from(outcome)
    }

    /// Serve datagrams until `token` is cancelled.
    ///
    /// Cancellation wins over a datagram that is ready at the same time, so
    /// nothing is admitted after the token fires.
    pub async fn run(self, token: CancellationToken) {
        info!("Starting UDP server on {}", self.local_addr);

        let mut buf = [0u8; MAX_DATAGRAM_SIZE];

        loop {
            let (len, peer) = tokio::select! {
                biased;
                _ = token.cancelled() => break,
                result = self.socket.recv_from(&mut buf) => match result {
                    Ok(received) => received,
                    Err(e) => {
                        warn!("Error reading from UDP socket: {}", e);
                        continue;
                    }
                },
            };

            let imsi = decode_imsi(&buf[..len]);
            info!("Received request from {}: IMSI={}", peer, imsi);

            let reply = self.handle_request(&imsi);

            match self.socket.send_to(reply.as_bytes(), peer).await {
                Ok(sent) => debug!("Sent {} bytes for IMSI {}: {}", sent, imsi, reply),
                Err(e) => error!("Failed to send reply for IMSI {} to {}: {}", imsi, peer, e),
            }
        }

        info!("UDP server stopped");
    }
}

impl fmt::Debug for RequestServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RequestServer({})", self.local_addr)
    }
}
