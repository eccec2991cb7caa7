//! Concurrent session table with admission control

use std::collections::HashMap;
use std::time::Instant;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::types::{AdmissionPolicy, CreateOutcome, Session};

/// Authoritative mapping from IMSI to [`Session`].
///
/// Every operation runs inside one short critical section on the inner
/// mutex. The mapping itself is never handed out; callers only see copies.
///
/// Between operations the table guarantees:
/// - no blacklisted IMSI is present
/// - `size() <= max_sessions`
/// - each IMSI appears at most once
#[derive(Debug)]
pub struct SessionTable {
    sessions: Mutex<HashMap<String, Session>>,
    policy: AdmissionPolicy,
}

impl SessionTable {
    /// Create an empty table governed by `policy`
    pub fn new(policy: AdmissionPolicy) -> Self {
        debug!(
            "SessionTable initialized with timeout: {:?}, max sessions: {}, blacklist size: {}",
            policy.session_timeout,
            policy.max_sessions,
            policy.blacklist.len()
        );

        Self {
            sessions: Mutex::new(HashMap::new()),
            policy,
        }
    }

    pub fn policy(&self) -> &AdmissionPolicy {
        &self.policy
    }

    /// Try to admit `imsi`, stamping a new session with the current time
    pub fn try_create(&self, imsi: &str) -> CreateOutcome {
        self.try_create_at(imsi, Instant::now())
    }

    /// Try to admit `imsi` with an explicit creation time.
    ///
    /// Checks run in a fixed order: blacklist, duplicate, capacity. A
    /// blacklisted IMSI is reported as such even when the table is full.
    pub fn try_create_at(&self, imsi: &str, now: Instant) -> CreateOutcome {
        if self.policy.is_blacklisted(imsi) {
            info!("Session rejected (blacklist): {}", imsi);
            return CreateOutcome::RejectedBlacklist;
        }

        let mut sessions = self.sessions.lock();

        if sessions.contains_key(imsi) {
            debug!("Session already exists: {}", imsi);
            return CreateOutcome::AlreadyExists;
        }

        if sessions.len() >= self.policy.max_sessions {
            warn!(
                "Session limit reached ({}), rejecting: {}",
                self.policy.max_sessions, imsi
            );
            return CreateOutcome::RejectedLimit;
        }

        sessions.insert(imsi.to_string(), Session::new(imsi, now));
        debug_assert!(
            sessions.len() <= self.policy.max_sessions,
            "session table over capacity"
        );
        drop(sessions);

        info!("Session created: {}", imsi);
        CreateOutcome::Created
    }

    /// Whether `imsi` currently has a session (expired-but-unswept counts)
    pub fn is_active(&self, imsi: &str) -> bool {
        self.sessions.lock().contains_key(imsi)
    }

    /// Remove `imsi` if present. Returns whether an entry was deleted.
    pub fn remove(&self, imsi: &str) -> bool {
        let removed = self.sessions.lock().remove(imsi).is_some();
        if removed {
            info!("Session removed: {}", imsi);
        }
        removed
    }

    /// Remove every session older than the configured timeout at `now`.
    ///
    /// Returns the number of removed sessions. No audit events are produced
    /// here; expiry is reported only through logs and the returned count.
    pub fn sweep_expired(&self, now: Instant) -> usize {
        let timeout = self.policy.session_timeout;
        let mut expired = Vec::new();

        self.sessions.lock().retain(|imsi, session| {
            if session.age(now) > timeout {
                expired.push(imsi.clone());
                false
            } else {
                true
            }
        });

        for imsi in &expired {
            debug!("Session expired: {}", imsi);
        }
        if !expired.is_empty() {
            info!("Removed {} expired sessions", expired.len());
        }

        expired.len()
    }

    /// Up to `limit` IMSIs currently present, in no particular order
    pub fn snapshot_keys(&self, limit: usize) -> Vec<String> {
        self.sessions
            .lock()
            .keys()
            .take(limit)
            .cloned()
            .collect()
    }

    /// Number of active sessions
    pub fn size(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }
}
