//! Session timing and policy configuration.
use std::env;
use std::time::Duration;

use crate::types::{
    DEFAULT_CONFIRM_DELAY_MS, DEFAULT_MOVE_TIMEOUT_SECS, DEFAULT_PACING_MS,
    DEFAULT_PEER_CONNECT_TIMEOUT_SECS, DEFAULT_RELAY_FAILURE_THRESHOLD, DEFAULT_RELAY_PROBE_SECS,
    HEALTH_BAR_LEN,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// Pause after a digit jump before the choice resolves.
    pub confirm_delay: Duration,
    /// Delay between revealed round chunks.
    pub pacing: Duration,
    /// Warn when no peer has joined a hosted room by then.
    pub peer_connect_timeout: Duration,
    /// Tear down a multiplayer session with no move activity for this long.
    pub move_timeout: Duration,
    /// When to check relay health while waiting for a peer.
    pub relay_probe: Duration,
    /// Relay failures observed before the advisory is shown.
    pub relay_failure_threshold: u32,
    pub health_bar_len: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            confirm_delay: Duration::from_millis(DEFAULT_CONFIRM_DELAY_MS),
            pacing: Duration::from_millis(DEFAULT_PACING_MS),
            peer_connect_timeout: Duration::from_secs(DEFAULT_PEER_CONNECT_TIMEOUT_SECS),
            move_timeout: Duration::from_secs(DEFAULT_MOVE_TIMEOUT_SECS),
            relay_probe: Duration::from_secs(DEFAULT_RELAY_PROBE_SECS),
            relay_failure_threshold: DEFAULT_RELAY_FAILURE_THRESHOLD,
            health_bar_len: HEALTH_BAR_LEN,
        }
    }
}

impl SessionConfig {
    /// Construct session configuration from environment variables.
    ///
    /// Environment variables:
    /// - `DUEL_CONFIRM_DELAY_MS` (default: 200)
    /// - `DUEL_PACING_MS` (default: 400)
    /// - `DUEL_PEER_TIMEOUT_SECS` (default: 300)
    /// - `DUEL_MOVE_TIMEOUT_SECS` (default: 600)
    /// - `DUEL_RELAY_PROBE_SECS` (default: 30)
    /// - `DUEL_RELAY_FAILURE_THRESHOLD` (default: 3, minimum 1)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(ms) = read_env::<u64>("DUEL_CONFIRM_DELAY_MS") {
            config.confirm_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = read_env::<u64>("DUEL_PACING_MS") {
            config.pacing = Duration::from_millis(ms);
        }
        if let Some(secs) = read_env::<u64>("DUEL_PEER_TIMEOUT_SECS") {
            config.peer_connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = read_env::<u64>("DUEL_MOVE_TIMEOUT_SECS") {
            config.move_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = read_env::<u64>("DUEL_RELAY_PROBE_SECS") {
            config.relay_probe = Duration::from_secs(secs);
        }
        if let Some(n) = read_env::<u32>("DUEL_RELAY_FAILURE_THRESHOLD") {
            config.relay_failure_threshold = n.max(1);
        }

        config
    }

    /// Zero delays, for tests and scripted runs.
    pub fn instant() -> Self {
        Self {
            confirm_delay: Duration::ZERO,
            pacing: Duration::ZERO,
            ..Self::default()
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.trim().parse().ok()
}
