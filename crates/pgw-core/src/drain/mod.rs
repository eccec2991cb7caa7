//! Graceful, rate-limited draining of active sessions

mod coordinator;
pub mod strategy;

pub use coordinator::{DrainCoordinator, ShutdownState};
pub use strategy::{DrainReport, DrainStrategy, FixedRateDrain, DEFAULT_DRAIN_INTERVAL};
