//! Client for the PGW emulator datagram protocol
//!
//! Sends one IMSI per request and waits for the `created` / `rejected`
//! reply. There are no retries: a lost datagram surfaces as a timeout.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use thiserror::Error;
use tokio::net::UdpSocket;
use tracing::{debug, info};

use pgw_core::transport::Reply;
use pgw_core::ClientConfig;

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration or core library error
    #[error(transparent)]
    Core(#[from] pgw_core::Error),

    /// Network error
    #[error("Network error: {0}")]
    Io(#[from] std::io::Error),

    /// No reply within the configured timeout
    #[error("No response from {server} after {timeout:?}")]
    Timeout { server: SocketAddr, timeout: Duration },

    /// Server replied with an empty datagram
    #[error("Empty response from {server}")]
    EmptyResponse { server: SocketAddr },
}

/// UDP client bound to one gateway
#[derive(Debug)]
pub struct UdpClient {
    socket: UdpSocket,
    server: SocketAddr,
    timeout: Duration,
}

impl UdpClient {
    /// Create a client for the server named in `config`
    pub async fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        Self::connect(config.server_addr()?, config.response_timeout()).await
    }

    /// Bind an ephemeral local socket and associate it with `server`
    pub async fn connect(server: SocketAddr, timeout: Duration) -> ClientResult<Self> {
        let local: SocketAddr = if server.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = UdpSocket::bind(local).await?;
        socket.connect(server).await?;
        info!("Client connected to server {}", server);

        Ok(Self {
            socket,
            server,
            timeout,
        })
    }

    pub fn server(&self) -> SocketAddr {
        self.server
    }

    /// Send `imsi` and return the raw reply text
    pub async fn send_request(&self, imsi: &str) -> ClientResult<String> {
        let sent = self.socket.send(imsi.as_bytes()).await?;
        info!("Sent {} bytes: IMSI={}", sent, imsi);

        let mut buf = [0u8; 128];
        let received = tokio::time::timeout(self.timeout, self.socket.recv(&mut buf))
            .await
            .map_err(|_| ClientError::Timeout {
                server: self.server,
                timeout: self.timeout,
            })??;

        if received == 0 {
            return Err(ClientError::EmptyResponse {
                server: self.server,
            });
        }

        let response = String::from_utf8_lossy(&buf[..received]).into_owned();
        info!("Received {} bytes: {}", received, response);
        if Reply::parse(response.as_bytes()).is_none() {
            debug!("Unrecognized reply from {}: {:?}", self.server, response);
        }

        Ok(response)
    }
}
