//! Platform-agnostic input event types.
//!
//! The console host maps its native key events to these variants. The shell
//! never sees raw terminal input.

use serde::{Deserialize, Serialize};

/// A platform-agnostic line-editing event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Character typed into the editable line.
    TextInput(char),
    /// Backspace / delete-left.
    Backspace,
    /// Submit the editable line (Enter).
    Submit,
    /// Recall the previous history entry (Arrow Up).
    HistoryBack,
    /// Recall the next history entry (Arrow Down).
    HistoryForward,
    /// Complete the command name (Tab).
    Complete,
    /// Discard the editable line (Ctrl-C).
    Interrupt,
    /// User requested quit (Ctrl-D, window close, etc.).
    Quit,
}
