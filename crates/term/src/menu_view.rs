//! MenuView: maps a prompt and its selection session into a framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::core::catalog::starts_category;
use crate::core::SelectionSession;
use crate::fb::{CellStyle, FrameBuffer};
use crate::text::truncate_to_width;
use crate::types::{Line, SelectableItem, Tone};

pub const HELP_LINE: &str = "↑/↓ move  Enter select  1-9,0 jump  PgUp/PgDn scroll  Esc quit";

/// Rows used by everything except the preamble and the item list: header,
/// blank, two scroll indicators, description, footer.
const CHROME_ROWS: usize = 6;

/// Item rows always kept visible, even with a long preamble.
const MIN_LIST_ROWS: usize = 3;

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

pub struct MenuView {
    /// Columns reserved on the left for category labels.
    gutter: u16,
}

impl Default for MenuView {
    fn default() -> Self {
        Self { gutter: 12 }
    }
}

impl MenuView {
    /// Preamble rows that fit in `height`.
    fn preamble_rows(height: u16, preamble_len: usize) -> usize {
        preamble_len.min((height as usize).saturating_sub(CHROME_ROWS + 1 + MIN_LIST_ROWS))
    }

    /// Number of item rows a viewport of `height` leaves for the list.
    pub fn list_rows(&self, height: u16, preamble_len: usize) -> usize {
        let p = Self::preamble_rows(height, preamble_len);
        let spacer = usize::from(p > 0);
        (height as usize)
            .saturating_sub(CHROME_ROWS + p + spacer)
            .max(1)
    }

    pub fn render(
        &self,
        header: &str,
        preamble: &[Line],
        items: &[SelectableItem],
        session: &SelectionSession,
        viewport: Viewport,
    ) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        let width = viewport.width as usize;
        let dim = CellStyle::for_tone(Tone::Dim);

        let mut title = header.to_string();
        if session.needs_paging() {
            let range = session.visible_range();
            title.push_str(&format!(
                "  ({}-{} of {})",
                range.start + 1,
                range.end,
                session.len()
            ));
        }
        fb.put_str(
            0,
            0,
            &truncate_to_width(&title, width),
            CellStyle::for_tone(Tone::Accent),
        );

        let mut y: u16 = 2;
        let shown = Self::preamble_rows(viewport.height, preamble.len());
        for line in preamble.iter().take(shown) {
            fb.put_str(
                0,
                y,
                &truncate_to_width(&line.text, width),
                CellStyle::for_tone(line.tone),
            );
            y += 1;
        }
        if shown > 0 {
            y += 1;
        }

        if session.has_more_above() {
            let text = format!("▲ {} more", session.scroll_offset());
            fb.put_str(self.gutter, y, &text, dim);
        }
        y += 1;

        let range = session.visible_range();
        let first_visible = range.start;
        for index in range.clone() {
            let item = &items[index];
            let label_here = index == first_visible || starts_category(items, index);
            self.render_row(&mut fb, y, index, item, label_here, index == session.highlighted());
            y += 1;
        }
        // Keep the lower chrome anchored when the list is short.
        y += (session.viewport_rows() - range.len()) as u16;

        if session.has_more_below() {
            let below = session.len() - range.end;
            fb.put_str(self.gutter, y, &format!("▼ {below} more"), dim);
        }
        y += 1;

        if let Some(desc) = items
            .get(session.highlighted())
            .and_then(|i| i.description.as_deref())
        {
            fb.put_str(2, y, &truncate_to_width(desc, width.saturating_sub(2)), dim);
        }
        y += 1;

        fb.put_str(0, y, &truncate_to_width(HELP_LINE, width), dim);
        fb
    }

    fn render_row(
        &self,
        fb: &mut FrameBuffer,
        y: u16,
        index: usize,
        item: &SelectableItem,
        show_label: bool,
        highlighted: bool,
    ) {
        if show_label && self.gutter > 1 {
            let label = truncate_to_width(&item.category, self.gutter as usize - 1);
            fb.put_str(0, y, &label, CellStyle::for_tone(Tone::Info));
        }

        let base = CellStyle::for_tone(Tone::Plain);
        let mut x = self.gutter;
        if highlighted {
            x = fb.put_str(x, y, "► ", CellStyle::for_tone(Tone::Accent));
            x = fb.put_str(x, y, &format!("{:>2}. {}", index + 1, item.name), base.inverted());
        } else {
            x = fb.put_str(x, y, "  ", base);
            x = fb.put_str(x, y, &format!("{:>2}. {}", index + 1, item.name), base);
        }

        let meta = &item.meta;
        if let Some(range) = &meta.range {
            x = fb.put_str(x, y, &format!(" [{range}]"), CellStyle::for_tone(Tone::Info));
        }
        if meta.modifier != 0 {
            x = fb.put_str(x, y, &format!(" {:+}", meta.modifier), CellStyle::for_tone(Tone::Dim));
        }
        if meta.bonus != 0 {
            let tone = if meta.bonus > 0 { Tone::Good } else { Tone::Bad };
            x = fb.put_str(x, y, &format!(" bonus {:+}", meta.bonus), CellStyle::for_tone(tone));
        }
        if let Some(equipment) = &meta.equipment {
            fb.put_str(x, y, &format!(" ({equipment})"), CellStyle::for_tone(Tone::Dim));
        }
    }
}
