//! Line-oriented console output between prompts.
//!
//! While a prompt owns the screen, console output is held and flushed in
//! order once the prompt releases it.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use crossterm::tty::IsTty;

use crate::text::paint;
use crate::types::Line;

pub trait Output {
    fn emit(&mut self, line: &Line);

    /// Buffer output until [`Output::release`].
    fn hold(&mut self);

    /// Stop buffering and flush held lines.
    fn release(&mut self);

    fn emit_all(&mut self, lines: &[Line]) {
        for line in lines {
            self.emit(line);
        }
    }
}

pub struct StdoutConsole {
    color: bool,
    held: bool,
    pending: Vec<Line>,
}

impl StdoutConsole {
    /// Colors are enabled only when stdout is a terminal.
    pub fn new() -> Self {
        Self::with_color(io::stdout().is_tty())
    }

    pub fn with_color(color: bool) -> Self {
        Self {
            color,
            held: false,
            pending: Vec::new(),
        }
    }

    fn write_line(&self, line: &Line) {
        let mut stdout = io::stdout().lock();
        let text = if self.color {
            paint(line)
        } else {
            line.text.clone()
        };
        if let Err(err) = writeln!(stdout, "{text}").and_then(|_| stdout.flush()) {
            tracing::warn!(error = %err, "failed to write console output");
        }
    }
}

impl Default for StdoutConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Output for StdoutConsole {
    fn emit(&mut self, line: &Line) {
        if self.held {
            self.pending.push(line.clone());
        } else {
            self.write_line(line);
        }
    }

    fn hold(&mut self) {
        self.held = true;
    }

    fn release(&mut self) {
        self.held = false;
        for line in std::mem::take(&mut self.pending) {
            self.write_line(&line);
        }
    }
}

/// Records emitted lines; clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct MemoryConsole {
    log: Rc<RefCell<Vec<Line>>>,
    held: bool,
    pending: Vec<Line>,
}

impl MemoryConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines flushed so far.
    pub fn lines(&self) -> Vec<Line> {
        self.log.borrow().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.log.borrow().iter().map(|l| l.text.clone()).collect()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl Output for MemoryConsole {
    fn emit(&mut self, line: &Line) {
        if self.held {
            self.pending.push(line.clone());
        } else {
            self.log.borrow_mut().push(line.clone());
        }
    }

    fn hold(&mut self) {
        self.held = true;
    }

    fn release(&mut self) {
        self.held = false;
        self.log.borrow_mut().append(&mut self.pending);
    }
}
