//! Raw key sources.
//!
//! A [`KeySource`] yields decoded [`Key`]s lazily. Sources are restartable:
//! the prompt driver calls [`KeySource::reset`] when a new prompt opens so
//! keystrokes typed while no prompt was active are not replayed into it.

use std::collections::VecDeque;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use crossterm::event;
use crossterm::tty::IsTty;

use crate::map::map_event;
use crate::types::Key;

/// How often the terminal source polls crossterm for pending events.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(16);

#[async_trait(?Send)]
pub trait KeySource {
    /// Whether a human can answer prompts (both stdin and stdout are TTYs).
    fn is_interactive(&self) -> bool;

    /// Next decoded key. `Ok(None)` means the input has ended.
    async fn next_key(&mut self) -> Result<Option<Key>>;

    /// Drop anything buffered before the current prompt opened.
    fn reset(&mut self) -> Result<()>;
}

/// Keys read from the controlling terminal through crossterm.
///
/// Events are polled without blocking and the task sleeps between polls, so
/// the single-threaded runtime keeps serving engine events while a prompt
/// waits for input.
#[derive(Debug, Clone)]
pub struct CrosstermKeys {
    poll_interval: Duration,
}

impl CrosstermKeys {
    pub fn new() -> Self {
        Self::with_poll_interval(DEFAULT_POLL_INTERVAL)
    }

    pub fn with_poll_interval(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }
}

impl Default for CrosstermKeys {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl KeySource for CrosstermKeys {
    fn is_interactive(&self) -> bool {
        std::io::stdin().is_tty() && std::io::stdout().is_tty()
    }

    async fn next_key(&mut self) -> Result<Option<Key>> {
        loop {
            while event::poll(Duration::ZERO)? {
                if let Some(key) = map_event(event::read()?) {
                    return Ok(Some(key));
                }
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    fn reset(&mut self) -> Result<()> {
        let mut dropped = 0usize;
        while event::poll(Duration::ZERO)? {
            let _ = event::read()?;
            dropped += 1;
        }
        if dropped > 0 {
            tracing::debug!(dropped, "discarded stale terminal events");
        }
        Ok(())
    }
}

/// A fixed key script, used by tests and headless runs.
#[derive(Debug, Clone, Default)]
pub struct ScriptedKeys {
    keys: VecDeque<Key>,
    interactive: bool,
    hold_open: bool,
    gap: Option<Duration>,
}

impl ScriptedKeys {
    /// An interactive script that reports end-of-input once exhausted.
    pub fn new(keys: impl IntoIterator<Item = Key>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
            interactive: true,
            hold_open: false,
            gap: None,
        }
    }

    /// A script that claims no TTY is attached.
    pub fn non_interactive() -> Self {
        Self {
            interactive: false,
            ..Self::default()
        }
    }

    /// Wait forever instead of reporting end-of-input when exhausted.
    pub fn hold_open(mut self) -> Self {
        self.hold_open = true;
        self
    }

    /// Sleep before delivering each key.
    pub fn with_gap(mut self, gap: Duration) -> Self {
        self.gap = Some(gap);
        self
    }

    pub fn push(&mut self, key: Key) {
        self.keys.push_back(key);
    }

    pub fn remaining(&self) -> usize {
        self.keys.len()
    }
}

#[async_trait(?Send)]
impl KeySource for ScriptedKeys {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    async fn next_key(&mut self) -> Result<Option<Key>> {
        match self.keys.pop_front() {
            Some(key) => {
                if let Some(gap) = self.gap {
                    tokio::time::sleep(gap).await;
                }
                Ok(Some(key))
            }
            None if self.hold_open => std::future::pending::<Result<Option<Key>>>().await,
            None => Ok(None),
        }
    }

    // Scripted keys are intentional input, not stale buffer contents.
    fn reset(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_keys_in_order_then_end() {
        let mut keys = ScriptedKeys::new([Key::Down, Key::Enter]);
        assert!(keys.is_interactive());
        assert_eq!(keys.next_key().await.unwrap(), Some(Key::Down));
        assert_eq!(keys.next_key().await.unwrap(), Some(Key::Enter));
        assert_eq!(keys.next_key().await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn held_open_script_never_ends() {
        let mut keys = ScriptedKeys::new(Vec::new()).hold_open();
        let res = tokio::time::timeout(Duration::from_secs(5), keys.next_key()).await;
        assert!(res.is_err());
    }

    #[test]
    fn non_interactive_script() {
        assert!(!ScriptedKeys::non_interactive().is_interactive());
    }
}
