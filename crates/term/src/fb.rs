//! Framebuffer and style types for terminal rendering.

use unicode_width::UnicodeWidthChar;

use crate::types::Tone;

/// Marks the right half of a double-width character.
pub const CONTINUATION: char = '\0';

/// 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Minimal per-cell styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellStyle {
    pub fg: Rgb,
    pub bg: Rgb,
    pub bold: bool,
    pub dim: bool,
}

impl Default for CellStyle {
    fn default() -> Self {
        Self {
            fg: Rgb::new(220, 220, 220),
            bg: Rgb::new(0, 0, 0),
            bold: false,
            dim: false,
        }
    }
}

impl CellStyle {
    /// Palette for semantic tones.
    pub fn for_tone(tone: Tone) -> Self {
        let base = Self::default();
        match tone {
            Tone::Plain => base,
            Tone::Info => Self {
                fg: Rgb::new(110, 170, 255),
                ..base
            },
            Tone::Good => Self {
                fg: Rgb::new(90, 210, 120),
                ..base
            },
            Tone::Warn => Self {
                fg: Rgb::new(240, 200, 80),
                ..base
            },
            Tone::Bad => Self {
                fg: Rgb::new(235, 90, 90),
                ..base
            },
            Tone::Accent => Self {
                fg: Rgb::new(250, 250, 250),
                bold: true,
                ..base
            },
            Tone::Dim => Self { dim: true, ..base },
        }
    }

    /// Inverted colors, used for the highlighted row.
    pub fn inverted(self) -> Self {
        Self {
            fg: self.bg,
            bg: self.fg,
            bold: true,
            ..self
        }
    }
}

/// A single terminal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub style: CellStyle,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            style: CellStyle::default(),
        }
    }
}

/// 2D framebuffer of styled character cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        let len = (width as usize) * (height as usize);
        Self {
            width,
            height,
            cells: vec![Cell::default(); len],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    #[inline(always)]
    fn idx(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y as usize) * (self.width as usize) + (x as usize))
    }

    pub fn get(&self, x: u16, y: u16) -> Option<Cell> {
        self.idx(x, y).map(|i| self.cells[i])
    }

    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if let Some(i) = self.idx(x, y) {
            self.cells[i] = cell;
        }
    }

    pub fn put_char(&mut self, x: u16, y: u16, ch: char, style: CellStyle) {
        self.set(x, y, Cell { ch, style });
    }

    /// Write `s` starting at column `x`, clipped to the row.
    ///
    /// Double-width characters take two cells (the second holds
    /// [`CONTINUATION`]); one that would straddle the right edge is dropped.
    /// Zero-width and control characters are skipped. Returns the column after
    /// the last written cell.
    pub fn put_str(&mut self, x: u16, y: u16, s: &str, style: CellStyle) -> u16 {
        let mut cx = x;
        for ch in s.chars() {
            let w = match ch.width() {
                Some(w) if w > 0 => w as u16,
                _ => continue,
            };
            if cx.saturating_add(w) > self.width {
                break;
            }
            self.put_char(cx, y, ch, style);
            if w == 2 {
                self.put_char(cx + 1, y, CONTINUATION, style);
            }
            cx += w;
        }
        cx
    }

    /// Row contents as text, without continuation markers or trailing blanks.
    pub fn row_text(&self, y: u16) -> String {
        let mut out: String = (0..self.width)
            .filter_map(|x| self.get(x, y))
            .map(|c| c.ch)
            .filter(|&ch| ch != CONTINUATION)
            .collect();
        out.truncate(out.trim_end().len());
        out
    }

    /// All rows as text.
    pub fn text(&self) -> Vec<String> {
        (0..self.height).map(|y| self.row_text(y)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_str_clips_at_edge() {
        let mut fb = FrameBuffer::new(5, 1);
        let end = fb.put_str(2, 0, "abcdef", CellStyle::default());
        assert_eq!(end, 5);
        assert_eq!(fb.row_text(0), "  abc");
    }

    #[test]
    fn wide_chars_take_two_cells() {
        let mut fb = FrameBuffer::new(6, 1);
        let end = fb.put_str(0, 0, "a剣b", CellStyle::default());
        assert_eq!(end, 4);
        assert_eq!(fb.get(2, 0).unwrap().ch, CONTINUATION);
        assert_eq!(fb.row_text(0), "a剣b");
    }

    #[test]
    fn wide_char_at_edge_is_dropped() {
        let mut fb = FrameBuffer::new(2, 1);
        fb.put_str(1, 0, "剣", CellStyle::default());
        assert_eq!(fb.get(1, 0).unwrap().ch, ' ');
    }

    #[test]
    fn tones_map_to_distinct_styles() {
        assert_ne!(CellStyle::for_tone(Tone::Good), CellStyle::for_tone(Tone::Bad));
        assert!(CellStyle::for_tone(Tone::Dim).dim);
        let inv = CellStyle::default().inverted();
        assert_eq!(inv.bg, CellStyle::default().fg);
    }
}
