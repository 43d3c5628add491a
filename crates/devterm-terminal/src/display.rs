//! Output surface abstraction.

use crate::interpreter::{OutputLine, StyleTag};

/// Where shell output goes.
pub trait DisplaySink {
    /// Append one line.
    fn write(&mut self, text: &str, style: Option<StyleTag>);

    /// Empty the view.
    fn clear(&mut self);
}

/// In-memory display, used by tests and for scripted sessions.
#[derive(Debug, Default, Clone)]
pub struct BufferDisplay {
    lines: Vec<OutputLine>,
}

impl BufferDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[OutputLine] {
        &self.lines
    }

    /// Text of every line, styles dropped.
    pub fn texts(&self) -> Vec<&str> {
        self.lines.iter().map(|l| l.text.as_str()).collect()
    }

    pub fn last(&self) -> Option<&OutputLine> {
        self.lines.last()
    }

    /// Drain the buffer.
    pub fn take(&mut self) -> Vec<OutputLine> {
        std::mem::take(&mut self.lines)
    }
}

impl DisplaySink for BufferDisplay {
    fn write(&mut self, text: &str, style: Option<StyleTag>) {
        self.lines.push(OutputLine {
            text: text.to_string(),
            style,
        });
    }

    fn clear(&mut self) {
        self.lines.clear();
    }
}
