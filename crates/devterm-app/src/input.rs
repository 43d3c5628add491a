//! Console key events to shell input events.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use devterm_types::input::InputEvent;

/// Translate one key event. Releases and keys with no editing meaning map
/// to `None`.
pub fn map_key(key: KeyEvent) -> Option<InputEvent> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => Some(InputEvent::Interrupt),
        KeyCode::Char('d') if ctrl => Some(InputEvent::Quit),
        KeyCode::Char(_) if ctrl => None,
        KeyCode::Char(ch) => Some(InputEvent::TextInput(ch)),
        KeyCode::Enter => Some(InputEvent::Submit),
        KeyCode::Backspace => Some(InputEvent::Backspace),
        KeyCode::Up => Some(InputEvent::HistoryBack),
        KeyCode::Down => Some(InputEvent::HistoryForward),
        KeyCode::Tab => Some(InputEvent::Complete),
        _ => None,
    }
}
