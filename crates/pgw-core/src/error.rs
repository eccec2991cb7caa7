//! Error types for the PGW core library

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for PGW core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while starting or running the gateway.
///
/// Admission decisions are never reported through this type; see
/// [`CreateOutcome`](crate::session::CreateOutcome).
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file could not be opened
    #[error("Config file not found: {path}: {source}")]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid JSON or has wrong field types
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// Configuration parsed but holds unusable values
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// A socket could not be bound
    #[error("Failed to bind {component} socket on {addr}: {source}")]
    Bind {
        component: &'static str,
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Audit log file could not be opened
    #[error("Failed to open audit log {path}: {source}")]
    AuditOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A single audit record could not be written
    #[error("Failed to write audit record: {0}")]
    AuditWrite(#[source] std::io::Error),

    /// Logging subsystem could not be initialised
    #[error("Logging setup failed: {message}")]
    Logging { message: String },

    /// Network error
    #[error("Network error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid configuration error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a socket setup error for `component` on `addr`
    pub fn bind(component: &'static str, addr: SocketAddr, source: std::io::Error) -> Self {
        Self::Bind {
            component,
            addr,
            source,
        }
    }

    /// Create a logging setup error
    pub fn logging(message: impl Into<String>) -> Self {
        Self::Logging {
            message: message.into(),
        }
    }

    /// Whether the error must abort process startup.
    pub fn is_startup_fatal(&self) -> bool {
        !matches!(self, Error::AuditWrite(_) | Error::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_setup_errors_are_startup_fatal() {
        let addr: SocketAddr = "127.0.0.1:9000".parse().unwrap();
        let err = Error::bind("UDP", addr, std::io::Error::other("no local address"));

        assert!(err.is_startup_fatal());
        assert!(err.to_string().contains("UDP"));
        assert!(err.to_string().contains("127.0.0.1:9000"));
    }

    #[test]
    fn test_runtime_io_errors_are_recoverable() {
        assert!(!Error::Io(std::io::Error::other("send failed")).is_startup_fatal());
        assert!(!Error::AuditWrite(std::io::Error::other("disk full")).is_startup_fatal());
        assert!(Error::invalid_config("bad").is_startup_fatal());
    }
}
