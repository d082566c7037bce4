//! Key mapping from terminal events to prompt keys.

use crate::types::Key;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Map keyboard input to prompt keys.
pub fn map_key_event(key: KeyEvent) -> Option<Key> {
    if is_interrupt(key) {
        return Some(Key::Interrupt);
    }
    match key.code {
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K') => Some(Key::Up),
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J') => Some(Key::Down),
        KeyCode::PageUp => Some(Key::PageUp),
        KeyCode::PageDown => Some(Key::PageDown),
        KeyCode::Enter | KeyCode::Char('\r') | KeyCode::Char('\n') => Some(Key::Enter),
        KeyCode::Char(c @ '0'..='9') => Some(Key::Digit(c as u8 - b'0')),
        KeyCode::Esc => Some(Key::Escape),
        _ => None,
    }
}

/// Map any terminal event. Key releases and repeats are dropped so terminals
/// that report them do not double-step the highlight.
pub fn map_event(event: Event) -> Option<Key> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => map_key_event(key),
        Event::Resize(width, height) => Some(Key::Resize { width, height }),
        _ => None,
    }
}

/// Ctrl-C arrives as a key in raw mode.
pub fn is_interrupt(key: KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, KeyModifiers};

    #[test]
    fn test_navigation_keys() {
        assert_eq!(map_key_event(KeyEvent::from(KeyCode::Up)), Some(Key::Up));
        assert_eq!(map_key_event(KeyEvent::from(KeyCode::Down)), Some(Key::Down));
        assert_eq!(map_key_event(KeyEvent::from(KeyCode::Char('k'))), Some(Key::Up));
        assert_eq!(map_key_event(KeyEvent::from(KeyCode::Char('J'))), Some(Key::Down));
        assert_eq!(map_key_event(KeyEvent::from(KeyCode::PageUp)), Some(Key::PageUp));
        assert_eq!(
            map_key_event(KeyEvent::from(KeyCode::PageDown)),
            Some(Key::PageDown)
        );
    }

    #[test]
    fn test_select_and_digits() {
        assert_eq!(map_key_event(KeyEvent::from(KeyCode::Enter)), Some(Key::Enter));
        assert_eq!(
            map_key_event(KeyEvent::from(KeyCode::Char('0'))),
            Some(Key::Digit(0))
        );
        assert_eq!(
            map_key_event(KeyEvent::from(KeyCode::Char('7'))),
            Some(Key::Digit(7))
        );
    }

    #[test]
    fn test_abort_keys() {
        assert_eq!(map_key_event(KeyEvent::from(KeyCode::Esc)), Some(Key::Escape));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key_event(ctrl_c), Some(Key::Interrupt));
        assert_eq!(map_key_event(KeyEvent::from(KeyCode::Char('c'))), None);
    }

    #[test]
    fn test_unmapped() {
        assert_eq!(map_key_event(KeyEvent::from(KeyCode::Left)), None);
        assert_eq!(map_key_event(KeyEvent::from(KeyCode::Char('x'))), None);
    }

    #[test]
    fn test_release_ignored_resize_mapped() {
        let release = KeyEvent {
            code: KeyCode::Enter,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(map_event(Event::Key(release)), None);
        assert_eq!(
            map_event(Event::Key(KeyEvent::from(KeyCode::Enter))),
            Some(Key::Enter)
        );
        assert_eq!(
            map_event(Event::Resize(80, 24)),
            Some(Key::Resize {
                width: 80,
                height: 24
            })
        );
    }
}
