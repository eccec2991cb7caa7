//! Session storage, admission policy and expiry

pub mod reaper;
pub mod table;
pub mod types;

pub use reaper::ExpiryReaper;
pub use table::SessionTable;
pub use types::{AdmissionPolicy, CreateOutcome, Session};
