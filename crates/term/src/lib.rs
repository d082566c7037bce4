//! Terminal display layer.
//!
//! Prompts render into a simple framebuffer that is flushed to the terminal
//! as one full-frame write. Outside of prompts, output is plain toned lines
//! written through an [`Output`] console.
//!
//! - [`fb`], [`text`]: display primitives (cells, widths, boxes, colour)
//! - [`renderer`]: the [`Screen`] trait, the crossterm screen and an
//!   in-memory one for tests
//! - [`guard`]: raw-mode lease and terminal restore on panic
//! - [`menu_view`], [`prompt`]: the selection prompt
//! - [`console`]: line output held while a prompt is open

pub mod console;
pub mod fb;
pub mod guard;
pub mod menu_view;
pub mod prompt;
pub mod renderer;
pub mod text;

pub use duel_core as core;
pub use duel_input as input;
pub use duel_types as types;

pub use console::{MemoryConsole, Output, StdoutConsole};
pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use guard::{install_panic_hook, restore_terminal, ScreenLease};
pub use menu_view::{MenuView, Viewport};
pub use prompt::{select, Choice, ChoiceVia, Outcome, Prompt, SelectError, SelectOptions};
pub use renderer::{encode_full_into, MemoryScreen, Screen, TerminalRenderer};
pub use text::{display_width, frame_box, paint, pad_to_width, truncate_to_width};
