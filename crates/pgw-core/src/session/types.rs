//! Session and admission types

use std::collections::HashSet;
use std::fmt;
use std::time::{Duration, Instant};

use crate::audit::AuditAction;

/// One admitted subscriber
#[derive(Debug, Clone)]
pub struct Session {
    pub imsi: String,
    pub created_at: Instant,
}

impl Session {
    pub(crate) fn new(imsi: impl Into<String>, created_at: Instant) -> Self {
        Self {
            imsi: imsi.into(),
            created_at,
        }
    }

    /// Age of the session at `now`; zero if `now` precedes creation.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }
}

/// Immutable admission policy fixed at construction
#[derive(Debug, Clone)]
pub struct AdmissionPolicy {
    /// IMSIs that are never admitted
    pub blacklist: HashSet<String>,
    /// Capacity of the table
    pub max_sessions: usize,
    /// Sessions older than this are removed by a sweep
    pub session_timeout: Duration,
}

impl AdmissionPolicy {
    pub fn new<I, S>(blacklist: I, max_sessions: usize, session_timeout: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            blacklist: blacklist.into_iter().map(Into::into).collect(),
            max_sessions,
            session_timeout,
        }
    }

    pub fn is_blacklisted(&self, imsi: &str) -> bool {
        self.blacklist.contains(imsi)
    }
}

/// Result of an admission attempt.
///
/// Rejections are expected outcomes, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CreateOutcome {
    Created,
    AlreadyExists,
    RejectedBlacklist,
    RejectedLimit,
}

impl CreateOutcome {
    pub fn is_rejected(&self) -> bool {
        matches!(
            self,
            CreateOutcome::RejectedBlacklist | CreateOutcome::RejectedLimit
        )
    }

    /// Audit action recorded for this outcome
    pub fn audit_action(&self) -> AuditAction {
        match self {
            CreateOutcome::Created => AuditAction::Created,
            CreateOutcome::AlreadyExists => AuditAction::Exists,
            CreateOutcome::RejectedBlacklist | CreateOutcome::RejectedLimit => {
                AuditAction::Rejected
            }
        }
    }
}

impl fmt::Display for CreateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CreateOutcome::Created => "created",
            CreateOutcome::AlreadyExists => "already exists",
            CreateOutcome::RejectedBlacklist => "rejected (blacklist)",
            CreateOutcome::RejectedLimit => "rejected (limit)",
        };
        f.write_str(s)
    }
}
