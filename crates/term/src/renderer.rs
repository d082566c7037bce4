//! Screens: where prompt frames go.
//!
//! Every frame is a full redraw. The framebuffer is encoded into one byte
//! buffer and written with a single `write_all`, so a frame never appears
//! half-drawn.

use std::io::{self, Write};

use anyhow::{bail, Result};
use crossterm::{
    cursor,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal,
    tty::IsTty,
    QueueableCommand,
};

use crate::fb::{CellStyle, FrameBuffer, Rgb, CONTINUATION};
use crate::guard::{enter_raw_screen, restore_terminal};

/// Size used when the terminal cannot report one.
pub const FALLBACK_SIZE: (u16, u16) = (80, 24);

pub trait Screen {
    /// Whether frames reach a real terminal.
    fn is_interactive(&self) -> bool;

    /// Current `(width, height)` in cells.
    fn size(&self) -> Result<(u16, u16)>;

    /// Enter raw mode and the alternate screen.
    fn acquire(&mut self) -> Result<()>;

    /// Leave raw mode and the alternate screen.
    fn release(&mut self) -> Result<()>;

    /// Replace the whole screen with `fb`.
    fn present(&mut self, fb: &FrameBuffer) -> Result<()>;
}

pub struct TerminalRenderer {
    stdout: io::Stdout,
    buf: Vec<u8>,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            buf: Vec::with_capacity(16 * 1024),
        }
    }

    fn flush_buf(&mut self) -> Result<()> {
        self.stdout.write_all(&self.buf)?;
        self.stdout.flush()?;
        Ok(())
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for TerminalRenderer {
    fn is_interactive(&self) -> bool {
        self.stdout.is_tty()
    }

    fn size(&self) -> Result<(u16, u16)> {
        Ok(terminal::size().unwrap_or(FALLBACK_SIZE))
    }

    fn acquire(&mut self) -> Result<()> {
        if let Err(err) = enter_raw_screen(&mut self.stdout) {
            restore_terminal();
            return Err(err);
        }
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        restore_terminal();
        Ok(())
    }

    fn present(&mut self, fb: &FrameBuffer) -> Result<()> {
        self.buf.clear();
        encode_full_into(fb, &mut self.buf)?;
        self.flush_buf()
    }
}

/// Encode a full-frame redraw into `out`.
///
/// This builds a sequence of crossterm commands without writing to stdout.
pub fn encode_full_into(fb: &FrameBuffer, out: &mut Vec<u8>) -> Result<()> {
    out.queue(cursor::MoveTo(0, 0))?;
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let mut current_style: Option<CellStyle> = None;
    for y in 0..fb.height() {
        out.queue(cursor::MoveTo(0, y))?;
        for x in 0..fb.width() {
            let cell = fb.get(x, y).unwrap_or_default();
            if cell.ch == CONTINUATION {
                continue;
            }
            if current_style != Some(cell.style) {
                apply_style_into(out, cell.style)?;
                current_style = Some(cell.style);
            }
            out.queue(Print(cell.ch))?;
        }
    }

    out.queue(ResetColor)?;
    out.queue(SetAttribute(Attribute::Reset))?;
    Ok(())
}

fn apply_style_into(out: &mut Vec<u8>, style: CellStyle) -> Result<()> {
    out.queue(SetForegroundColor(rgb_to_color(style.fg)))?;
    out.queue(SetBackgroundColor(rgb_to_color(style.bg)))?;
    out.queue(SetAttribute(Attribute::Reset))?;
    if style.bold {
        out.queue(SetAttribute(Attribute::Bold))?;
    }
    if style.dim {
        out.queue(SetAttribute(Attribute::Dim))?;
    }
    Ok(())
}

fn rgb_to_color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}

/// In-memory screen that records presented frames as text.
#[derive(Debug, Clone)]
pub struct MemoryScreen {
    width: u16,
    height: u16,
    interactive: bool,
    fail_acquire: bool,
    active: bool,
    acquired: usize,
    released: usize,
    frames: Vec<Vec<String>>,
}

impl MemoryScreen {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            interactive: true,
            fail_acquire: false,
            active: false,
            acquired: 0,
            released: 0,
            frames: Vec::new(),
        }
    }

    pub fn non_interactive(mut self) -> Self {
        self.interactive = false;
        self
    }

    /// Make `acquire` fail, as when raw mode is unavailable.
    pub fn failing_acquire(mut self) -> Self {
        self.fail_acquire = true;
        self
    }

    pub fn frames(&self) -> &[Vec<String>] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&[String]> {
        self.frames.last().map(Vec::as_slice)
    }

    pub fn acquired(&self) -> usize {
        self.acquired
    }

    pub fn released(&self) -> usize {
        self.released
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl Screen for MemoryScreen {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn size(&self) -> Result<(u16, u16)> {
        Ok((self.width, self.height))
    }

    fn acquire(&mut self) -> Result<()> {
        if self.fail_acquire {
            bail!("raw mode unavailable");
        }
        self.active = true;
        self.acquired += 1;
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        self.active = false;
        self.released += 1;
        Ok(())
    }

    fn present(&mut self, fb: &FrameBuffer) -> Result<()> {
        if !self.active {
            bail!("frame presented without an acquired screen");
        }
        self.frames.push(fb.text());
        Ok(())
    }
}
