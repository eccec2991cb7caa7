//! Datagram wire format
//!
//! A request is the raw IMSI with no framing. A response is the ASCII text
//! `created` or `rejected`.

use std::fmt;

use crate::session::CreateOutcome;

/// Receive buffer size; room for a 15-digit IMSI plus one spare byte
pub const MAX_DATAGRAM_SIZE: usize = 16;

/// Reply sent back to the requesting peer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Created,
    Rejected,
}

impl Reply {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reply::Created => "created",
            Reply::Rejected => "rejected",
        }
    }

    pub fn as_bytes(&self) -> &'static [u8] {
        self.as_str().as_bytes()
    }

    pub fn parse(payload: &[u8]) -> Option<Self> {
        match payload {
            b"created" => Some(Reply::Created),
            b"rejected" => Some(Reply::Rejected),
            _ => None,
        }
    }
}

impl From<CreateOutcome> for Reply {
    /// An existing session reads as `created` to the peer
    fn from(outcome: CreateOutcome) -> Self {
        if outcome.is_rejected() {
            Reply::Rejected
        } else {
            Reply::Created
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decode a request payload into an IMSI.
///
/// Any byte sequence is accepted; invalid UTF-8 is replaced, nothing is
/// trimmed or validated.
pub fn decode_imsi(payload: &[u8]) -> String {
    String::from_utf8_lossy(payload).into_owned()
}
