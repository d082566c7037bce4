//! Terminal input module - raw-input driver.
//!
//! Maps `crossterm` events into prompt [`Key`](crate::types::Key)s and
//! exposes them through the restartable [`KeySource`] trait. Cooked line
//! input for names and room codes lives in [`line`].

pub mod line;
pub mod map;
pub mod source;

pub use duel_types as types;

pub use line::{read_or_default, LineSource, ScriptedLines, StdinLines};
pub use map::{is_interrupt, map_event, map_key_event};
pub use source::{CrosstermKeys, KeySource, ScriptedKeys};
