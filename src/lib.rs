//! Sword duel terminal front-end (workspace facade crate).
//!
//! The implementation lives in dedicated crates under `crates/`; this
//! package re-exports them under one name for the binary and the
//! integration tests.

pub mod logging;

pub use duel_adapter as adapter;
pub use duel_core as core;
pub use duel_input as input;
pub use duel_session as session;
pub use duel_term as term;
pub use duel_types as types;
