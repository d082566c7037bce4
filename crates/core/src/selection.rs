//! Selection session - highlight and scroll state for one prompt.
//!
//! The session is a pure state machine over item indices. It knows nothing
//! about rendering or terminals; the prompt driver feeds it decoded keys and
//! acts on the returned [`Step`].
//!
//! Navigation policy:
//! - Up/Down wrap around (circular list).
//! - Page Up/Down shift the scroll offset by one viewport, clamped to
//!   `[0, len - viewport_rows]`, and never move the highlight.
//! - Any step that leaves the highlight off-screen re-centers the viewport
//!   on it (clamped).

use std::ops::Range;

use crate::types::Key;

/// What the driver should do after a key was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// State changed; redraw the frame.
    Redraw,
    /// Resolve immediately with this index.
    Resolve(usize),
    /// Highlight moved to this index; redraw, pause, then resolve.
    Confirm(usize),
    /// Abort the prompt.
    Abort,
    /// Nothing to do.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSession {
    len: usize,
    highlighted: usize,
    scroll_offset: usize,
    viewport_rows: usize,
}

impl SelectionSession {
    /// Create a session over `len` items showing `viewport_rows` at a time.
    pub fn new(len: usize, viewport_rows: usize) -> Self {
        Self {
            len,
            highlighted: 0,
            scroll_offset: 0,
            viewport_rows: viewport_rows.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn viewport_rows(&self) -> usize {
        self.viewport_rows
    }

    /// Item indices currently inside the viewport.
    pub fn visible_range(&self) -> Range<usize> {
        let end = (self.scroll_offset + self.viewport_rows).min(self.len);
        self.scroll_offset.min(end)..end
    }

    pub fn is_visible(&self, index: usize) -> bool {
        self.visible_range().contains(&index)
    }

    /// Whether the list is longer than the viewport.
    pub fn needs_paging(&self) -> bool {
        self.len > self.viewport_rows
    }

    pub fn has_more_above(&self) -> bool {
        self.scroll_offset > 0
    }

    pub fn has_more_below(&self) -> bool {
        self.scroll_offset + self.viewport_rows < self.len
    }

    fn max_offset(&self) -> usize {
        self.len.saturating_sub(self.viewport_rows)
    }

    pub fn move_down(&mut self) {
        if self.len == 0 {
            return;
        }
        self.highlighted = (self.highlighted + 1) % self.len;
        self.follow_highlight();
    }

    pub fn move_up(&mut self) {
        if self.len == 0 {
            return;
        }
        self.highlighted = if self.highlighted == 0 {
            self.len - 1
        } else {
            self.highlighted - 1
        };
        self.follow_highlight();
    }

    /// Scroll one page down. Returns whether the offset changed.
    pub fn page_down(&mut self) -> bool {
        if !self.needs_paging() {
            return false;
        }
        let next = (self.scroll_offset + self.viewport_rows).min(self.max_offset());
        let changed = next != self.scroll_offset;
        self.scroll_offset = next;
        changed
    }

    /// Scroll one page up. Returns whether the offset changed.
    pub fn page_up(&mut self) -> bool {
        if !self.needs_paging() {
            return false;
        }
        let next = self.scroll_offset.saturating_sub(self.viewport_rows);
        let changed = next != self.scroll_offset;
        self.scroll_offset = next;
        changed
    }

    /// Move the highlight to `index` (ignored when out of range).
    pub fn highlight(&mut self, index: usize) {
        if index < self.len {
            self.highlighted = index;
            self.follow_highlight();
        }
    }

    /// Adopt a new viewport height (e.g. after a terminal resize).
    pub fn set_viewport_rows(&mut self, rows: usize) {
        self.viewport_rows = rows.max(1);
        self.scroll_offset = self.scroll_offset.min(self.max_offset());
        self.follow_highlight();
    }

    fn follow_highlight(&mut self) {
        if !self.is_visible(self.highlighted) {
            self.scroll_offset = self
                .highlighted
                .saturating_sub(self.viewport_rows / 2)
                .min(self.max_offset());
        }
    }

    /// Apply one decoded key.
    pub fn apply(&mut self, key: Key) -> Step {
        match key {
            Key::Up if self.len > 0 => {
                self.move_up();
                Step::Redraw
            }
            Key::Down if self.len > 0 => {
                self.move_down();
                Step::Redraw
            }
            Key::PageUp => {
                if self.page_up() {
                    Step::Redraw
                } else {
                    Step::Ignored
                }
            }
            Key::PageDown => {
                if self.page_down() {
                    Step::Redraw
                } else {
                    Step::Ignored
                }
            }
            Key::Enter if self.len > 0 => Step::Resolve(self.highlighted),
            Key::Digit(_) => match key.digit_index(self.len) {
                Some(index) => {
                    self.highlight(index);
                    Step::Confirm(index)
                }
                None => Step::Ignored,
            },
            Key::Escape | Key::Interrupt => Step::Abort,
            _ => Step::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn down_wraps_from_last_to_first() {
        let mut s = SelectionSession::new(3, 10);
        let mut seen = vec![s.highlighted()];
        for _ in 0..3 {
            assert_eq!(s.apply(Key::Down), Step::Redraw);
            seen.push(s.highlighted());
        }
        assert_eq!(seen, vec![0, 1, 2, 0]);
    }

    #[test]
    fn up_from_first_goes_to_last() {
        let mut s = SelectionSession::new(5, 10);
        s.apply(Key::Up);
        assert_eq!(s.highlighted(), 4);
    }

    #[test]
    fn enter_resolves_highlighted() {
        let mut s = SelectionSession::new(4, 10);
        s.apply(Key::Down);
        s.apply(Key::Down);
        assert_eq!(s.apply(Key::Enter), Step::Resolve(2));
    }

    #[test]
    fn digit_jumps_and_confirms() {
        let mut s = SelectionSession::new(4, 10);
        assert_eq!(s.apply(Key::Digit(3)), Step::Confirm(2));
        assert_eq!(s.highlighted(), 2);
        assert_eq!(s.apply(Key::Digit(5)), Step::Ignored);
        assert_eq!(s.highlighted(), 2);
    }

    #[test]
    fn zero_selects_tenth_item_only_with_ten_or_more() {
        let mut short = SelectionSession::new(9, 20);
        assert_eq!(short.apply(Key::Digit(0)), Step::Ignored);

        let mut long = SelectionSession::new(12, 20);
        assert_eq!(long.apply(Key::Digit(0)), Step::Confirm(9));
    }

    #[test]
    fn escape_and_interrupt_abort() {
        let mut s = SelectionSession::new(2, 10);
        assert_eq!(s.apply(Key::Escape), Step::Abort);
        assert_eq!(s.apply(Key::Interrupt), Step::Abort);
    }

    #[test]
    fn paging_is_ignored_when_everything_fits() {
        let mut s = SelectionSession::new(3, 5);
        assert_eq!(s.apply(Key::PageDown), Step::Ignored);
        assert_eq!(s.scroll_offset(), 0);
    }

    #[test]
    fn paging_clamps_and_keeps_highlight() {
        let mut s = SelectionSession::new(12, 5);
        assert_eq!(s.apply(Key::PageDown), Step::Redraw);
        assert_eq!(s.scroll_offset(), 5);
        assert_eq!(s.apply(Key::PageDown), Step::Redraw);
        assert_eq!(s.scroll_offset(), 7);
        assert_eq!(s.apply(Key::PageDown), Step::Ignored);
        assert_eq!(s.scroll_offset(), 7);
        assert_eq!(s.highlighted(), 0);

        assert_eq!(s.apply(Key::PageUp), Step::Redraw);
        assert_eq!(s.scroll_offset(), 2);
        s.apply(Key::PageUp);
        assert_eq!(s.scroll_offset(), 0);
        assert_eq!(s.apply(Key::PageUp), Step::Ignored);
    }

    #[test]
    fn navigation_recenters_off_screen_highlight() {
        let mut s = SelectionSession::new(20, 5);
        // Wrap to the last item: centered as far as the clamp allows.
        s.apply(Key::Up);
        assert_eq!(s.highlighted(), 19);
        assert_eq!(s.scroll_offset(), 15);

        // Jump into the middle of the list.
        s.apply(Key::Digit(0));
        assert_eq!(s.highlighted(), 9);
        assert_eq!(s.scroll_offset(), 7);
        assert!(s.is_visible(9));
    }

    #[test]
    fn stepping_within_viewport_keeps_offset() {
        let mut s = SelectionSession::new(20, 5);
        for _ in 0..4 {
            s.apply(Key::Down);
        }
        assert_eq!(s.highlighted(), 4);
        assert_eq!(s.scroll_offset(), 0);
        s.apply(Key::Down);
        assert_eq!(s.highlighted(), 5);
        assert_eq!(s.scroll_offset(), 3);
    }

    #[test]
    fn down_after_paging_away_brings_highlight_back() {
        let mut s = SelectionSession::new(20, 5);
        s.apply(Key::PageDown);
        s.apply(Key::PageDown);
        assert!(!s.is_visible(0));
        s.apply(Key::Down);
        assert_eq!(s.highlighted(), 1);
        assert!(s.is_visible(1));
        assert_eq!(s.scroll_offset(), 0);
    }

    #[test]
    fn resize_clamps_offset() {
        let mut s = SelectionSession::new(10, 3);
        s.highlight(9);
        assert_eq!(s.scroll_offset(), 7);
        s.set_viewport_rows(8);
        assert_eq!(s.scroll_offset(), 2);
        assert!(s.is_visible(9));
        s.set_viewport_rows(0);
        assert_eq!(s.viewport_rows(), 1);
    }

    #[test]
    fn visible_range_and_more_indicators() {
        let mut s = SelectionSession::new(7, 3);
        assert_eq!(s.visible_range(), 0..3);
        assert!(!s.has_more_above());
        assert!(s.has_more_below());
        s.page_down();
        s.page_down();
        assert_eq!(s.visible_range(), 4..7);
        assert!(s.has_more_above());
        assert!(!s.has_more_below());
    }

    #[test]
    fn empty_session_ignores_navigation() {
        let mut s = SelectionSession::new(0, 3);
        assert_eq!(s.apply(Key::Down), Step::Ignored);
        assert_eq!(s.apply(Key::Enter), Step::Ignored);
        assert_eq!(s.apply(Key::Digit(1)), Step::Ignored);
        assert_eq!(s.visible_range(), 0..0);
    }
}
