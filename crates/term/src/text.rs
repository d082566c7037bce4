//! Width-aware text helpers and ANSI colorization for line output.

use crossterm::style::Stylize;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::types::{Line, Tone};

/// Display width of `text` in terminal columns, ignoring ANSI escapes.
pub fn display_width(text: &str) -> usize {
    let clean = strip_ansi_escapes::strip(text);
    let clean = String::from_utf8_lossy(&clean);
    UnicodeWidthStr::width(&*clean)
}

/// Cut `text` to at most `max` columns, ending in `…` when cut.
pub fn truncate_to_width(text: &str, max: usize) -> String {
    if UnicodeWidthStr::width(text) <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > max - 1 {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

/// Right-pad `text` with spaces to `width` columns.
pub fn pad_to_width(text: &str, width: usize) -> String {
    let w = display_width(text);
    let mut out = text.to_string();
    out.extend(std::iter::repeat(' ').take(width.saturating_sub(w)));
    out
}

/// Frame `lines` in a box at least `min_width` columns wide (inner width).
///
/// Inner lines keep their tone; the border uses `border`.
pub fn frame_box(lines: &[Line], min_width: usize, border: Tone) -> Vec<Line> {
    let inner = lines
        .iter()
        .map(|l| display_width(&l.text))
        .max()
        .unwrap_or(0)
        .max(min_width);
    let rule = "─".repeat(inner + 2);

    let mut out = Vec::with_capacity(lines.len() + 2);
    out.push(Line::new(border, format!("┌{rule}┐")));
    for line in lines {
        out.push(Line::new(
            line.tone,
            format!("│ {} │", pad_to_width(&line.text, inner)),
        ));
    }
    out.push(Line::new(border, format!("└{rule}┘")));
    out
}

/// Render a line with ANSI color for its tone.
pub fn paint(line: &Line) -> String {
    let text = line.text.as_str();
    match line.tone {
        Tone::Plain => text.to_string(),
        Tone::Info => text.cyan().to_string(),
        Tone::Good => text.green().to_string(),
        Tone::Warn => text.yellow().to_string(),
        Tone::Bad => text.red().to_string(),
        Tone::Accent => text.bold().to_string(),
        Tone::Dim => text.dim().to_string(),
    }
}
