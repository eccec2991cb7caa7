//! Audit record types

use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, Local};

/// Timestamp layout used in audit records
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Subscriber-visible lifecycle transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditAction {
    Created,
    Exists,
    Rejected,
    GracefulRemove,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Created => "created",
            AuditAction::Exists => "exists",
            AuditAction::Rejected => "rejected",
            AuditAction::GracefulRemove => "graceful_remove",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audit record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    pub timestamp: DateTime<Local>,
    pub imsi: String,
    pub action: AuditAction,
}

impl AuditEvent {
    /// Create an event stamped with the current local time
    pub fn now(imsi: impl Into<String>, action: AuditAction) -> Self {
        Self {
            timestamp: Local::now(),
            imsi: imsi.into(),
            action,
        }
    }

    /// CSV line for this event, including the trailing newline
    pub fn to_csv_line(&self) -> String {
        format!(
            "{},{},{}\n",
            self.timestamp.format(TIMESTAMP_FORMAT),
            csv_field(&self.imsi),
            self.action
        )
    }
}

/// Quote a CSV field when it holds a separator, quote or line break
fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}
