//! Game session: turns engine events into prompts and console output.
//!
//! The [`Orchestrator`] owns the session state, the engine handle and the
//! terminal. Multiplayer bookkeeping (room codes, peer detection, relay
//! diagnostics) lives in [`multiplayer`].

pub mod config;
pub mod interrupt;
pub mod multiplayer;
pub mod orchestrator;
pub mod pacing;
pub mod state;

pub use duel_adapter as adapter;
pub use duel_core as core;
pub use duel_input as input;
pub use duel_term as term;
pub use duel_types as types;

pub use config::SessionConfig;
pub use interrupt::{ctrl_c, unless_interrupted};
pub use multiplayer::{is_relay_failure, MultiplayerState, PeerKind, RelayMonitor, RoomId, RoomIdError};
pub use orchestrator::{Orchestrator, SessionEnd, Terminal, DEFAULT_PLAYER_NAME};
pub use pacing::Pacer;
pub use state::{Phase, SessionState, SetupKind};
