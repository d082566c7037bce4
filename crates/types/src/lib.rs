//! Core types module - shared data structures and constants
//!
//! This crate defines the data model used throughout the duel front-end.
//! Everything here is plain data: engine payload shapes (deserialized from the
//! engine link), the selectable items the menu works on, the decoded key set
//! and the toned text lines produced by the renderer.
//!
//! # Policy Constants
//!
//! Timing values are defaults; every one of them can be overridden through
//! the session configuration.
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `DEFAULT_CONFIRM_DELAY_MS` | 200 | Highlight pause after a digit jump-select |
//! | `DEFAULT_PACING_MS` | 400 | Delay between round-result chunks |
//! | `DEFAULT_PEER_CONNECT_TIMEOUT_SECS` | 300 | Warn when no peer joined |
//! | `DEFAULT_MOVE_TIMEOUT_SECS` | 600 | Tear down a stalled multiplayer session |
//! | `DEFAULT_RELAY_PROBE_SECS` | 30 | Relay diagnostics probe |
//! | `DEFAULT_RELAY_FAILURE_THRESHOLD` | 3 | Relay failures before warning |
//!
//! # Examples
//!
//! ```
//! use duel_types::{GameMode, Key, Tone, Line};
//!
//! assert_eq!(GameMode::from_str("multiplayer"), Some(GameMode::Multiplayer));
//! assert_eq!(Key::Digit(3).digit_index(5), Some(2));
//! assert_eq!(Key::Digit(0).digit_index(12), Some(9));
//!
//! let line = Line::new(Tone::Good, "You dealt 5 damage");
//! assert_eq!(line.text, "You dealt 5 damage");
//! ```

use serde::{Deserialize, Serialize};

/// Highlight pause after a digit jump-select (milliseconds).
pub const DEFAULT_CONFIRM_DELAY_MS: u64 = 200;

/// Delay between round-result chunks (milliseconds).
pub const DEFAULT_PACING_MS: u64 = 400;

/// Wait for a multiplayer peer before warning (seconds).
pub const DEFAULT_PEER_CONNECT_TIMEOUT_SECS: u64 = 5 * 60;

/// Wait for an outstanding multiplayer move before giving up (seconds).
pub const DEFAULT_MOVE_TIMEOUT_SECS: u64 = 10 * 60;

/// Relay diagnostics probe after session start (seconds).
pub const DEFAULT_RELAY_PROBE_SECS: u64 = 30;

/// Relay failure notices tolerated before the connectivity warning.
pub const DEFAULT_RELAY_FAILURE_THRESHOLD: u32 = 3;

/// Room identifier length (uppercase alphanumeric).
pub const ROOM_ID_LEN: usize = 5;

/// Default health bar width in segments.
pub const HEALTH_BAR_LEN: usize = 20;

/// Items reachable by a single digit key ('1'..'9' then '0').
pub const MAX_DIGIT_ITEMS: usize = 10;

/// Game modes offered by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Single,
    Multiplayer,
}

impl GameMode {
    /// Parse mode from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "single" => Some(GameMode::Single),
            "multiplayer" => Some(GameMode::Multiplayer),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Single => "single",
            GameMode::Multiplayer => "multiplayer",
        }
    }
}

/// Decoded keyboard input, independent of the terminal binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    PageUp,
    PageDown,
    Enter,
    /// A digit key, `0..=9`.
    Digit(u8),
    Escape,
    /// Ctrl-C while the terminal is in raw mode.
    Interrupt,
    Resize { width: u16, height: u16 },
}

impl Key {
    /// Map a digit key to a zero-based item index for a list of `len` items.
    ///
    /// `1`..`9` address items 1-9, `0` addresses item 10 (only when the list
    /// has at least ten items). Out-of-range digits yield `None`.
    pub fn digit_index(&self, len: usize) -> Option<usize> {
        let Key::Digit(d) = *self else {
            return None;
        };
        let index = match d {
            0 => MAX_DIGIT_ITEMS - 1,
            1..=9 => d as usize - 1,
            _ => return None,
        };
        (index < len).then_some(index)
    }
}

/// Semantic tone of a rendered line; colorization happens at display time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tone {
    #[default]
    Plain,
    Info,
    Good,
    Warn,
    Bad,
    Accent,
    Dim,
}

/// One line of toned display text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Line {
    pub tone: Tone,
    pub text: String,
}

impl Line {
    pub fn new(tone: Tone, text: impl Into<String>) -> Self {
        Self {
            tone,
            text: text.into(),
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(Tone::Plain, text)
    }

    pub fn blank() -> Self {
        Self::default()
    }
}

/// Metadata shown next to a selectable item.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemMeta {
    pub range: Option<String>,
    pub modifier: i32,
    /// Next-round bonus that applies when this item is chosen.
    pub bonus: i32,
    /// Equipment the item depends on.
    pub equipment: Option<String>,
}

/// An entry in a selection prompt.
///
/// Identity is `id`; ids are unique within one prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectableItem {
    pub id: String,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub meta: ItemMeta,
}

impl SelectableItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            description: None,
            meta: ItemMeta::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A move as listed by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveData {
    pub id: String,
    pub name: String,
    /// Move type; also the key next-round bonuses are granted under.
    pub tag: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub modifier: i32,
    /// Equipment the move requires.
    #[serde(default)]
    pub requires: Option<String>,
}

/// Worn and wielded equipment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Equipment {
    #[serde(default)]
    pub weapon: Option<String>,
    #[serde(default)]
    pub shield: Option<String>,
    #[serde(default)]
    pub armor: Option<String>,
}

impl Equipment {
    /// Equipped pieces as `(slot, item)` pairs in slot order.
    pub fn pieces(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("weapon", self.weapon.as_deref()),
            ("shield", self.shield.as_deref()),
            ("armor", self.armor.as_deref()),
        ]
        .into_iter()
        .filter_map(|(slot, item)| item.map(|item| (slot, item)))
    }
}

/// One side of the duel as exposed by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Combatant {
    pub name: String,
    /// Character slug.
    #[serde(default)]
    pub character: String,
    pub health: i32,
    pub max_health: i32,
    #[serde(default)]
    pub equipment: Equipment,
}

impl Combatant {
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }
}

/// Engine state the renderer reads: both combatants and our move list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineView {
    pub me: Combatant,
    pub opponent: Combatant,
    #[serde(default)]
    pub moves: Vec<MoveData>,
}

/// A selectable character from the engine roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterSummary {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub health: i32,
}

/// A next-round modifier keyed by move type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bonus {
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: i32,
}

impl Bonus {
    pub fn new(kind: impl Into<String>, amount: i32) -> Self {
        Self {
            kind: kind.into(),
            amount,
        }
    }
}

/// Reference to the move a side used in a round.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tag: String,
}

/// Outcome of a round for one side, including next-round constraints.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundResult {
    pub name: String,
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub restrict: Vec<String>,
    #[serde(default)]
    pub allow_only: Vec<String>,
}

/// Per-side round snapshot.
///
/// `score` is absent when the side did not attempt a scoring move; a present
/// score of zero means the attempt landed without damage.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundData {
    pub my_move: MoveRef,
    pub opponent_move: MoveRef,
    pub result: RoundResult,
    #[serde(default)]
    pub score: Option<i32>,
    #[serde(default)]
    pub move_modifier: i32,
    #[serde(default)]
    pub bonus: i32,
    #[serde(default)]
    pub total_score: i32,
    #[serde(default)]
    pub next_round_bonus: Vec<Bonus>,
}

impl RoundData {
    /// Whether this side attempted a scoring move this round.
    pub fn attempted_hit(&self) -> bool {
        self.score.is_some()
    }
}

/// Alias used by the orchestrator for cached round data.
pub type RoundSnapshot = RoundData;
