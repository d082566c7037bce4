//! Core duel front-end logic - pure, deterministic, and testable
//!
//! Nothing in this crate touches the terminal, the network or the clock
//! (apart from [`SimpleRng::from_clock`]). The terminal and session crates
//! drive these types and render their output.
//!
//! # Module Structure
//!
//! - [`selection`]: highlight/scroll state machine behind every prompt
//! - [`catalog`]: engine move lists and rosters to ordered selectable items
//! - [`status`]: health bars, bonus and restriction summaries
//! - [`combat`]: per-round damage breakdown and end-of-game summary
//! - [`rng`]: seedable LCG for room codes
//!
//! # Example
//!
//! ```
//! use duel_core::{SelectionSession, Step};
//! use duel_core::types::Key;
//!
//! let mut session = SelectionSession::new(3, 10);
//! session.apply(Key::Down);
//! assert_eq!(session.apply(Key::Enter), Step::Resolve(1));
//! ```

pub mod catalog;
pub mod combat;
pub mod rng;
pub mod selection;
pub mod status;

pub use duel_types as types;

pub use catalog::{categorize, character_items, move_items, CatalogError};
pub use combat::{damage_breakdown, outcome_lines, round_chunks, GameOutcome};
pub use rng::SimpleRng;
pub use selection::{SelectionSession, Step};
pub use status::{bonus_summary, health_bar, restriction_list, tactical_lines, HealthBar, HealthTier};
