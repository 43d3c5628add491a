//! Session state: mode, working directory, history, presentation.

use std::fmt;
use std::time::Duration;

use devterm_platform::{Persistence, keys};
use devterm_types::config::TerminalConfig;
use devterm_types::error::{DevtermError, Result};
use devterm_vfs::{AbsolutePath, FilesystemTree};

use crate::blackjack::Round;
use crate::presentation::Presentation;

/// The command table a session is working with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Mode {
    #[default]
    Development,
    MarketData,
    Network,
    Utilities,
    Filesystem,
    Novelty,
}

impl Mode {
    pub const ALL: [Mode; 6] = [
        Mode::Development,
        Mode::MarketData,
        Mode::Network,
        Mode::Utilities,
        Mode::Filesystem,
        Mode::Novelty,
    ];

    /// User-facing name, also the persisted value.
    pub fn short_name(self) -> &'static str {
        match self {
            Self::Development => "dev",
            Self::MarketData => "crypto",
            Self::Network => "network",
            Self::Utilities => "tools",
            Self::Filesystem => "fs",
            Self::Novelty => "fun",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Development => &["development"],
            Self::MarketData => &["market", "market-data"],
            Self::Network => &["net"],
            Self::Utilities => &["utilities"],
            Self::Filesystem => &["filesystem"],
            Self::Novelty => &["novelty"],
        }
    }

    /// Comma-separated short names, in table order.
    pub fn names() -> String {
        Self::ALL.map(Mode::short_name).join(", ")
    }

    /// Parse a short name or alias (case-insensitive).
    pub fn parse(name: &str) -> Result<Self> {
        let lower = name.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.short_name() == lower || m.aliases().contains(&lower.as_str()))
            .ok_or_else(|| DevtermError::InvalidMode {
                name: name.to_string(),
                available: Self::names(),
            })
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Position of history navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryCursor {
    At(usize),
    /// Editing a fresh line.
    PastEnd,
}

/// Fixed identity of the session, from the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub user: String,
    pub hostname: String,
    pub home: AbsolutePath,
    pub default_mode: Mode,
    pub alert_interval: Duration,
}

impl Profile {
    pub fn from_config(config: &TerminalConfig) -> Self {
        let default_mode = Mode::parse(&config.default_mode).unwrap_or_else(|e| {
            log::warn!("Config default_mode: {e}; using dev");
            Mode::Development
        });
        Self {
            user: config.user.clone(),
            hostname: config.hostname.clone(),
            home: AbsolutePath::parse(&config.home),
            default_mode,
            alert_interval: Duration::from_secs(config.alert_interval_secs.max(1)),
        }
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::from_config(&TerminalConfig::default())
    }
}

/// Mutable per-session state.
#[derive(Debug)]
pub struct SessionState {
    pub mode: Mode,
    /// Always names an existing directory.
    pub cwd: AbsolutePath,
    history: Vec<String>,
    cursor: HistoryCursor,
    pub presentation: Presentation,
    /// Hand in progress, if any.
    pub blackjack: Option<Round>,
}

impl SessionState {
    pub fn new(mode: Mode, cwd: AbsolutePath) -> Self {
        Self {
            mode,
            cwd,
            history: Vec::new(),
            cursor: HistoryCursor::PastEnd,
            presentation: Presentation::default(),
            blackjack: None,
        }
    }

    /// Startup state: stored mode (else the profile default), home as cwd
    /// when it exists (else root), stored presentation settings.
    pub fn restore(store: &Persistence, fs: &FilesystemTree, profile: &Profile) -> Self {
        let mode = match store.get(keys::MODE) {
            Some(name) => Mode::parse(&name).unwrap_or_else(|e| {
                log::warn!("Stored mode ignored: {e}");
                profile.default_mode
            }),
            None => profile.default_mode,
        };
        let cwd = if fs.is_directory(&profile.home) {
            profile.home.clone()
        } else {
            AbsolutePath::root()
        };
        let mut state = Self::new(mode, cwd);
        state.presentation = Presentation::load(store);
        state
    }

    /// Switch mode and persist the choice.
    pub fn set_mode(&mut self, mode: Mode, store: &Persistence) {
        if self.mode != mode {
            log::info!("Mode {} -> {}", self.mode, mode);
        }
        self.mode = mode;
        store.set(keys::MODE, mode.short_name());
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn cursor(&self) -> HistoryCursor {
        self.cursor
    }

    /// Append a submitted line and reset navigation.
    pub fn record(&mut self, line: &str) {
        self.history.push(line.to_string());
        self.cursor = HistoryCursor::PastEnd;
    }

    /// Step back; `None` only when the history is empty.
    pub fn history_back(&mut self) -> Option<&str> {
        let last = self.history.len().checked_sub(1)?;
        let idx = match self.cursor {
            HistoryCursor::PastEnd => last,
            HistoryCursor::At(i) => i.saturating_sub(1),
        };
        self.cursor = HistoryCursor::At(idx);
        Some(&self.history[idx])
    }

    /// Step forward; past the last entry the cursor resets and the fresh
    /// (empty) line is returned.
    pub fn history_forward(&mut self) -> &str {
        match self.cursor {
            HistoryCursor::At(i) if i + 1 < self.history.len() => {
                self.cursor = HistoryCursor::At(i + 1);
                &self.history[i + 1]
            },
            _ => {
                self.cursor = HistoryCursor::PastEnd;
                ""
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_history(lines: &[&str]) -> SessionState {
        let mut s = SessionState::new(Mode::Filesystem, AbsolutePath::root());
        for l in lines {
            s.record(l);
        }
        s
    }

    #[test]
    fn mode_parse_names_and_aliases() {
        assert_eq!(Mode::parse("dev").unwrap(), Mode::Development);
        assert_eq!(Mode::parse("market-data").unwrap(), Mode::MarketData);
        assert_eq!(Mode::parse("NET").unwrap(), Mode::Network);
        assert_eq!(Mode::parse("tools").unwrap(), Mode::Utilities);
        assert_eq!(Mode::parse("filesystem").unwrap(), Mode::Filesystem);
        assert_eq!(Mode::parse("novelty").unwrap(), Mode::Novelty);
    }

    #[test]
    fn mode_parse_invalid() {
        let err = Mode::parse("warp").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid mode: warp. Available: dev, crypto, network, tools, fs, fun"
        );
    }

    #[test]
    fn history_boundaries() {
        let mut s = with_history(&["ls", "pwd"]);
        assert_eq!(s.history_back(), Some("pwd"));
        assert_eq!(s.history_back(), Some("ls"));
        assert_eq!(s.history_back(), Some("ls"));
        assert_eq!(s.cursor(), HistoryCursor::At(0));
        assert_eq!(s.history_forward(), "pwd");
        assert_eq!(s.history_forward(), "");
        assert_eq!(s.cursor(), HistoryCursor::PastEnd);
        assert_eq!(s.history(), ["ls", "pwd"]);
    }

    #[test]
    fn history_empty() {
        let mut s = with_history(&[]);
        assert_eq!(s.history_back(), None);
        assert_eq!(s.history_forward(), "");
    }

    #[test]
    fn record_resets_cursor_and_keeps_duplicates() {
        let mut s = with_history(&["ls"]);
        s.history_back();
        s.record("ls");
        assert_eq!(s.cursor(), HistoryCursor::PastEnd);
        assert_eq!(s.history().len(), 2);
    }

    #[test]
    fn restore_prefers_stored_mode() {
        let store = Persistence::in_memory();
        store.set(keys::MODE, "crypto");
        let fs = FilesystemTree::with_default_layout();
        let s = SessionState::restore(&store, &fs, &Profile::default());
        assert_eq!(s.mode, Mode::MarketData);
        assert_eq!(s.cwd.to_string(), "/home/user");
    }

    #[test]
    fn restore_invalid_mode_falls_back() {
        let store = Persistence::in_memory();
        store.set(keys::MODE, "warp");
        let fs = FilesystemTree::new();
        let s = SessionState::restore(&store, &fs, &Profile::default());
        assert_eq!(s.mode, Mode::Development);
        assert!(s.cwd.is_root());
    }

    #[test]
    fn set_mode_persists() {
        let store = Persistence::in_memory();
        let mut s = SessionState::new(Mode::Development, AbsolutePath::root());
        s.set_mode(Mode::Novelty, &store);
        assert_eq!(store.get(keys::MODE).as_deref(), Some("fun"));
    }

    #[test]
    fn profile_from_config() {
        let cfg = TerminalConfig {
            default_mode: "fs".into(),
            home: "/home/ada/".into(),
            alert_interval_secs: 0,
            ..TerminalConfig::default()
        };
        let p = Profile::from_config(&cfg);
        assert_eq!(p.default_mode, Mode::Filesystem);
        assert_eq!(p.home.to_string(), "/home/ada");
        assert_eq!(p.alert_interval, Duration::from_secs(1));
    }

    #[test]
    fn profile_bad_default_mode() {
        let cfg = TerminalConfig {
            default_mode: "warp".into(),
            ..TerminalConfig::default()
        };
        assert_eq!(Profile::from_config(&cfg).default_mode, Mode::Development);
    }
}
