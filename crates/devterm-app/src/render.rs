//! Console display: styled output lines and the prompt line.

use std::io::Write;

use crossterm::cursor::{MoveTo, MoveToColumn};
use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use devterm_terminal::presentation::Palette;
use devterm_terminal::{DisplaySink, StyleTag};

/// Parse `#rrggbb`.
pub fn hex_color(hex: &str) -> Option<Color> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
    Some(Color::Rgb {
        r: channel(0)?,
        g: channel(2)?,
        b: channel(4)?,
    })
}

/// Writes shell output to a console.
///
/// In raw mode the cursor sits on the prompt line, so every output line
/// first wipes it and ends with `\r\n`; the caller redraws the prompt.
pub struct ConsoleDisplay<W: Write> {
    out: W,
    palette: Palette,
    raw: bool,
    colored: bool,
    dirty: bool,
}

impl<W: Write> ConsoleDisplay<W> {
    pub fn new(out: W, palette: Palette, raw: bool, colored: bool) -> Self {
        Self {
            out,
            palette,
            raw,
            colored,
            dirty: true,
        }
    }

    /// Follow theme and color changes made by commands.
    pub fn set_palette(&mut self, palette: Palette) {
        if self.palette != palette {
            self.palette = palette;
            self.dirty = true;
        }
    }

    fn color_for(&self, style: Option<StyleTag>) -> Option<Color> {
        let hex = match style {
            None => self.palette.text,
            Some(StyleTag::System) => self.palette.secondary,
            Some(StyleTag::Success) => self.palette.prompt,
            Some(StyleTag::Error) => self.palette.error,
        };
        hex_color(hex)
    }

    fn emit(&mut self, text: &str, color: Option<Color>) -> std::io::Result<()> {
        if self.raw {
            queue!(self.out, MoveToColumn(0), Clear(ClearType::CurrentLine))?;
        }
        match color.filter(|_| self.colored) {
            Some(c) => queue!(self.out, SetForegroundColor(c), Print(text), ResetColor)?,
            None => queue!(self.out, Print(text))?,
        }
        queue!(self.out, Print(if self.raw { "\r\n" } else { "\n" }))?;
        self.out.flush()
    }

    /// Redraw `prompt input` on the current line if anything changed.
    pub fn draw_prompt(&mut self, prompt: &str, input: &str, force: bool) -> std::io::Result<()> {
        if !(self.dirty || force) {
            return Ok(());
        }
        self.dirty = false;
        queue!(self.out, MoveToColumn(0), Clear(ClearType::CurrentLine))?;
        match hex_color(self.palette.prompt).filter(|_| self.colored) {
            Some(c) => queue!(self.out, SetForegroundColor(c), Print(prompt), ResetColor)?,
            None => queue!(self.out, Print(prompt))?,
        }
        queue!(self.out, Print(" "), Print(input))?;
        self.out.flush()
    }

    /// Leave the cursor on a fresh line.
    pub fn finish(&mut self) -> std::io::Result<()> {
        queue!(self.out, Print(if self.raw { "\r\n" } else { "\n" }))?;
        self.out.flush()
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> DisplaySink for ConsoleDisplay<W> {
    fn write(&mut self, text: &str, style: Option<StyleTag>) {
        let color = self.color_for(style);
        if let Err(e) = self.emit(text, color) {
            log::warn!("console write failed: {e}");
        }
        self.dirty = true;
    }

    fn clear(&mut self) {
        let result = queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))
            .and_then(|()| self.out.flush());
        if let Err(e) = result {
            log::warn!("console clear failed: {e}");
        }
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devterm_terminal::presentation::Theme;

    fn plain() -> ConsoleDisplay<Vec<u8>> {
        ConsoleDisplay::new(Vec::new(), Theme::Matrix.palette(), false, false)
    }

    #[test]
    fn parses_hex_colors() {
        assert_eq!(
            hex_color("#33ff33"),
            Some(Color::Rgb {
                r: 0x33,
                g: 0xff,
                b: 0x33
            })
        );
        assert_eq!(hex_color("33ff33"), None);
        assert_eq!(hex_color("#33ff3"), None);
        assert_eq!(hex_color("#gg0000"), None);
    }

    #[test]
    fn uncolored_lines_are_plain_text() {
        let mut d = plain();
        d.write("hello", None);
        d.write("oops", Some(StyleTag::Error));
        assert_eq!(String::from_utf8(d.into_inner()).unwrap(), "hello\noops\n");
    }

    #[test]
    fn colored_lines_carry_escape_codes() {
        let mut d = ConsoleDisplay::new(Vec::new(), Theme::Matrix.palette(), false, true);
        d.write("hi", Some(StyleTag::Error));
        let out = String::from_utf8(d.into_inner()).unwrap();
        assert!(out.contains("\u{1b}["));
        assert!(out.contains("hi"));
    }

    #[test]
    fn raw_mode_uses_crlf() {
        let mut d = ConsoleDisplay::new(Vec::new(), Theme::Matrix.palette(), true, false);
        d.write("line", None);
        assert!(String::from_utf8(d.into_inner()).unwrap().ends_with("line\r\n"));
    }

    #[test]
    fn prompt_redrawn_only_when_dirty() {
        let mut d = plain();
        d.draw_prompt("$", "ls", false).unwrap();
        let first = d.out.len();
        d.draw_prompt("$", "ls", false).unwrap();
        assert_eq!(d.out.len(), first);
        d.draw_prompt("$", "ls -a", true).unwrap();
        assert!(d.out.len() > first);
    }
}
