//! # PGW Core
//!
//! Session engine for the packet-gateway (PGW) emulator.
//!
//! This crate provides:
//! - [`SessionTable`]: the concurrent session store with blacklist,
//!   capacity and duplicate admission checks
//! - [`ExpiryReaper`]: periodic removal of sessions past their timeout
//! - [`RequestServer`]: the UDP loop admitting IMSIs for remote peers
//! - [`DrainCoordinator`]: rate-limited, run-to-completion draining used
//!   for graceful shutdown
//! - [`api`]: the control-plane HTTP API (`/check_subscriber`, `/stop`)
//! - [`audit`]: the CSV call detail record written for every
//!   subscriber-visible transition
//!
//! ## Architecture
//!
//! `SessionTable` is the only state shared between tasks and owns its own
//! lock. The UDP loop, the HTTP handlers, the reaper and the drain all go
//! through its small operation set; none of them hold a lock across an
//! await point. [`Gateway`] wires everything together for the server
//! binary.

pub mod api;
pub mod audit;
pub mod config;
pub mod drain;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod session;
pub mod transport;

pub use audit::{AuditAction, AuditEvent, AuditSink, CsvAuditSink, MemoryAuditSink};
pub use config::{ClientConfig, ServerConfig};
pub use drain::{DrainCoordinator, DrainReport, DrainStrategy, FixedRateDrain, ShutdownState};
pub use error::{Error, Result};
pub use gateway::{Gateway, ShutdownCause};
pub use session::{AdmissionPolicy, CreateOutcome, ExpiryReaper, SessionTable};
pub use transport::{Reply, RequestServer};
