//! Fonts, text colors, and themes.

use devterm_platform::{Persistence, keys};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Font {
    #[default]
    Classic,
    Retro,
    Modern,
}

impl Font {
    pub const ALL: [Font; 3] = [Font::Classic, Font::Retro, Font::Modern];

    pub fn name(self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Retro => "retro",
            Self::Modern => "modern",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextColor {
    Green,
    Red,
    Blue,
    Pink,
    White,
}

impl TextColor {
    pub const ALL: [TextColor; 5] = [
        TextColor::Green,
        TextColor::Red,
        TextColor::Blue,
        TextColor::Pink,
        TextColor::White,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Pink => "pink",
            Self::White => "white",
        }
    }

    pub fn hex(self) -> &'static str {
        match self {
            Self::Green => "#33ff33",
            Self::Red => "#ff3333",
            Self::Blue => "#33ccff",
            Self::Pink => "#ff33cc",
            Self::White => "#ffffff",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

/// Hex colors of a theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub bg: &'static str,
    pub text: &'static str,
    pub secondary: &'static str,
    pub error: &'static str,
    pub prompt: &'static str,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Matrix,
    Cyberpunk,
    Hacker,
    Retro,
    Ocean,
    Dracula,
}

impl Theme {
    pub const ALL: [Theme; 6] = [
        Theme::Matrix,
        Theme::Cyberpunk,
        Theme::Hacker,
        Theme::Retro,
        Theme::Ocean,
        Theme::Dracula,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Matrix => "matrix",
            Self::Cyberpunk => "cyberpunk",
            Self::Hacker => "hacker",
            Self::Retro => "retro",
            Self::Ocean => "ocean",
            Self::Dracula => "dracula",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    pub fn palette(self) -> Palette {
        match self {
            Self::Matrix => Palette {
                bg: "#0d0d0d",
                text: "#33ff33",
                secondary: "#cccccc",
                error: "#ff3333",
                prompt: "#00ccff",
            },
            Self::Cyberpunk => Palette {
                bg: "#0a0a0a",
                text: "#ff00ff",
                secondary: "#00ffff",
                error: "#ff0066",
                prompt: "#00ffff",
            },
            Self::Hacker => Palette {
                bg: "#000000",
                text: "#00ff00",
                secondary: "#00cc00",
                error: "#ff0000",
                prompt: "#00ff00",
            },
            Self::Retro => Palette {
                bg: "#1a1a1a",
                text: "#ffb000",
                secondary: "#ff8800",
                error: "#ff0000",
                prompt: "#ffcc00",
            },
            Self::Ocean => Palette {
                bg: "#001a33",
                text: "#00ccff",
                secondary: "#0099cc",
                error: "#ff6666",
                prompt: "#00ffff",
            },
            Self::Dracula => Palette {
                bg: "#282a36",
                text: "#f8f8f2",
                secondary: "#6272a4",
                error: "#ff5555",
                prompt: "#50fa7b",
            },
        }
    }

    /// Comma-separated list of theme names.
    pub fn names() -> String {
        Self::ALL.map(Theme::name).join(", ")
    }
}

/// Look-and-feel settings of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Presentation {
    pub font: Font,
    /// Text color override on top of the theme.
    pub color: Option<TextColor>,
    pub theme: Theme,
    pub fullscreen: bool,
}

impl Presentation {
    /// Read font, color, and theme from the store; unknown names are ignored.
    pub fn load(store: &Persistence) -> Self {
        let mut p = Self::default();
        if let Some(name) = store.get(keys::FONT) {
            match Font::parse(&name) {
                Some(font) => p.font = font,
                None => log::warn!("Ignoring stored font '{name}'"),
            }
        }
        if let Some(name) = store.get(keys::THEME) {
            match Theme::parse(&name) {
                Some(theme) => p.theme = theme,
                None => log::warn!("Ignoring stored theme '{name}'"),
            }
        }
        if let Some(name) = store.get(keys::COLOR) {
            match TextColor::parse(&name) {
                Some(color) => p.color = Some(color),
                None => log::warn!("Ignoring stored color '{name}'"),
            }
        }
        p
    }

    /// The theme palette with the text color override applied.
    pub fn palette(&self) -> Palette {
        let mut palette = self.theme.palette();
        if let Some(color) = self.color {
            palette.text = color.hex();
        }
        palette
    }
}
