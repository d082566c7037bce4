//! Multiplayer shim: room codes, peer tracking and relay diagnostics.
//!
//! Peer transport lives in the engine; the front-end only names the room,
//! watches for the peer and interprets transport log notices.

use std::fmt;

use thiserror::Error;

use crate::core::SimpleRng;
use crate::types::{ROOM_ID_LEN, DEFAULT_RELAY_FAILURE_THRESHOLD};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoomIdError {
    #[error("room id must be {expected} characters, got {got}")]
    Length { expected: usize, got: usize },
    #[error("room id may only contain letters and digits, found `{0}`")]
    InvalidChar(char),
}

/// A five character uppercase alphanumeric room code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomId(String);

impl RoomId {
    pub fn generate(rng: &mut SimpleRng) -> Self {
        Self(rng.alphanumeric(ROOM_ID_LEN))
    }

    /// Normalize (trim, uppercase) and validate user input.
    pub fn parse(input: &str) -> Result<Self, RoomIdError> {
        let normalized = input.trim().to_ascii_uppercase();
        if let Some(bad) = normalized.chars().find(|c| !c.is_ascii_alphanumeric()) {
            return Err(RoomIdError::InvalidChar(bad));
        }
        let got = normalized.chars().count();
        if got != ROOM_ID_LEN {
            return Err(RoomIdError::Length {
                expected: ROOM_ID_LEN,
                got,
            });
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerKind {
    Human,
    /// The engine substituted a computer opponent.
    Computer,
}

impl PeerKind {
    pub fn from_is_computer(is_computer: bool) -> Self {
        if is_computer {
            PeerKind::Computer
        } else {
            PeerKind::Human
        }
    }
}

/// Whether a transport log line reports a relay/ICE/TURN failure.
pub fn is_relay_failure(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    let mentions_relay = ["relay", "turn", "ice"].iter().any(|marker| {
        lower
            .split(|c: char| !c.is_ascii_alphanumeric())
            .any(|word| word == *marker)
    });
    let failed = ["fail", "error", "timeout", "timed out", "unreachable"]
        .iter()
        .any(|marker| lower.contains(marker));
    mentions_relay && failed
}

/// Counts relay failures and decides when to advise the user, once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayMonitor {
    failures: u32,
    threshold: u32,
    warned: bool,
}

impl Default for RelayMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_RELAY_FAILURE_THRESHOLD)
    }
}

impl RelayMonitor {
    pub fn new(threshold: u32) -> Self {
        Self {
            failures: 0,
            threshold: threshold.max(1),
            warned: false,
        }
    }

    /// Feed a transport log line. Returns `true` exactly once, when the
    /// failure count first reaches the threshold.
    pub fn observe(&mut self, message: &str) -> bool {
        if !is_relay_failure(message) {
            return false;
        }
        self.failures += 1;
        tracing::debug!(failures = self.failures, "relay failure observed");
        if !self.warned && self.failures >= self.threshold {
            self.warned = true;
            return true;
        }
        false
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn warned(&self) -> bool {
        self.warned
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiplayerState {
    pub room_id: Option<RoomId>,
    /// Whether we created the room (as opposed to joining it).
    pub hosting: bool,
    pub peer: Option<PeerKind>,
    pub relay: RelayMonitor,
    pub peer_timeout_warned: bool,
}

impl MultiplayerState {
    pub fn hosting(room_id: RoomId, relay_threshold: u32) -> Self {
        Self {
            room_id: Some(room_id),
            hosting: true,
            relay: RelayMonitor::new(relay_threshold),
            ..Self::default()
        }
    }

    pub fn joining(room_id: RoomId, relay_threshold: u32) -> Self {
        Self {
            room_id: Some(room_id),
            hosting: false,
            relay: RelayMonitor::new(relay_threshold),
            ..Self::default()
        }
    }

    pub fn peer_connected(&self) -> bool {
        self.peer.is_some()
    }

    pub fn has_human_peer(&self) -> bool {
        self.peer == Some(PeerKind::Human)
    }
}
