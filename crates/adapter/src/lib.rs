//! Adapter module - the boundary to the external duel engine
//!
//! The engine owns combat rules, characters and move resolution. This crate
//! connects to it over TCP and translates between its line-delimited JSON
//! protocol and typed Rust values.
//!
//! # Protocol Overview
//!
//! One JSON object per line, tagged by `type`:
//!
//! - Engine → client: `start`, `setup`, `round`, `myMove`, `opponentsMove`,
//!   `victory`, `defeat`, `roomFull`, `name`, `opponentCharacter`, `log`
//! - Client → engine: `setup`, `inputMove`, `disconnect`
//!
//! ```text
//! Client -> Engine: {"type":"setup","mode":"single","name":"Ann","character":"ann"}
//! Engine -> Client: {"type":"setup","state":{"me":{...},"opponent":{...},"moves":[...]}}
//! Client -> Engine: {"type":"inputMove","move":"thrust"}
//! Engine -> Client: {"type":"myMove","id":"thrust"}
//! Engine -> Client: {"type":"round","myRoundData":{...},"opponentsRoundData":{...}}
//! ```
//!
//! # Environment Variables
//!
//! - `DUEL_ENGINE_HOST`: engine address (default: "127.0.0.1")
//! - `DUEL_ENGINE_PORT`: engine port (default: 7878)
//! - `DUEL_ENGINE_LOG_PATH`: append raw wire traffic to this file
//!
//! # Implementation
//!
//! - [`EventBus`] fans decoded events out to subscribers in order
//! - [`KvStore`] holds the player name and character for the process lifetime
//! - [`TcpEngine`] owns reader/writer tasks; [`Engine`] is the send-side seam

pub mod bus;
pub mod client;
pub mod protocol;
pub mod store;

pub use duel_types as types;

pub use bus::{BusFault, EventBus, Inbound, SubscriptionId};
pub use client::{Engine, EngineConfig, EngineError, RecordingEngine, TcpEngine};
pub use protocol::{
    decode_event, encode_input, EngineEvent, EngineInput, EventName, ProtocolError, SetupRequest,
};
pub use store::{KvStore, MemoryStore, CHARACTER_KEY, PLAYER_NAME_KEY};
