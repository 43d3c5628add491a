//! Command trait, output model, environment, and the mode-scoped registry.

use std::collections::BTreeMap;
use std::time::Instant;

use devterm_platform::{NetworkClient, Persistence, TimeService};
use devterm_types::error::Result;
use devterm_vfs::FilesystemTree;

use crate::rng::SimpleRng;
use crate::scheduler::Scheduler;
use crate::session::{Mode, Profile, SessionState};

/// Display style of one output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleTag {
    System,
    Success,
    Error,
}

/// One line of styled output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub text: String,
    pub style: Option<StyleTag>,
}

impl OutputLine {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: None,
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: Some(StyleTag::System),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: Some(StyleTag::Success),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: Some(StyleTag::Error),
        }
    }
}

/// Full-screen programs the host runs on request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Program {
    Snake,
}

impl Program {
    /// Lines shown before the host takes over the screen.
    pub fn intro(self) -> &'static [&'static str] {
        match self {
            Self::Snake => &["Starting Snake game...", "Use W/A/S/D to move, Q to quit"],
        }
    }
}

/// Output produced by a command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutput {
    /// Unstyled text; each `\n`-separated line becomes one display line.
    Text(String),
    /// Individually styled lines.
    Lines(Vec<OutputLine>),
    /// Command produced no visible output.
    None,
    /// Signal to clear the display.
    Clear,
    /// Print a farewell and end the session.
    Exit { message: String },
    /// Hand the screen to a full-screen program.
    Launch(Program),
}

impl CommandOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Single error-styled line that is not a command failure.
    pub fn error_line(text: impl Into<String>) -> Self {
        Self::Lines(vec![OutputLine::error(text)])
    }
}

/// Everything a handler may read or mutate.
pub struct Environment<'a> {
    pub session: &'a mut SessionState,
    pub fs: &'a mut FilesystemTree,
    pub store: &'a Persistence,
    /// The registry itself, for `help`.
    pub commands: &'a CommandRegistry,
    pub scheduler: &'a mut Scheduler,
    pub rng: &'a mut SimpleRng,
    pub time: &'a dyn TimeService,
    pub network: &'a dyn NetworkClient,
    pub profile: &'a Profile,
    /// The line after the command name, spacing intact.
    pub raw_args: &'a str,
    /// Monotonic time of this dispatch.
    pub now: Instant,
}

/// A single executable command.
pub trait Command {
    /// The command name (what the user types).
    fn name(&self) -> &str;

    /// One-line description for `help`.
    fn description(&self) -> &str;

    /// Usage string (e.g. "ls \[path\]").
    fn usage(&self) -> &str;

    /// Execute the command with the given arguments and environment.
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput>;
}

type Table = BTreeMap<String, Box<dyn Command>>;

/// Global command table plus one table per [`Mode`].
///
/// Lookup consults the global table first, so a global command shadows a
/// mode command of the same name.
#[derive(Default)]
pub struct CommandRegistry {
    global: Table,
    modes: BTreeMap<Mode, Table>,
}

impl CommandRegistry {
    /// Create an empty command registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command available in every mode. Replaces any existing
    /// global command with the same name.
    pub fn register_global(&mut self, cmd: Box<dyn Command>) {
        self.global.insert(cmd.name().to_ascii_lowercase(), cmd);
    }

    /// Register a command for one mode.
    pub fn register(&mut self, mode: Mode, cmd: Box<dyn Command>) {
        self.modes
            .entry(mode)
            .or_default()
            .insert(cmd.name().to_ascii_lowercase(), cmd);
    }

    /// Find `name` (case-insensitive) for the given mode.
    pub fn resolve(&self, name: &str, mode: Mode) -> Option<&dyn Command> {
        let key = name.to_ascii_lowercase();
        self.global
            .get(&key)
            .or_else(|| self.modes.get(&mode).and_then(|t| t.get(&key)))
            .map(|b| b.as_ref())
    }

    /// `(name, description)` pairs of the global table, sorted by name.
    pub fn global_commands(&self) -> Vec<(&str, &str)> {
        self.global
            .values()
            .map(|c| (c.name(), c.description()))
            .collect()
    }

    /// `(name, description)` pairs of one mode's table, sorted by name.
    pub fn mode_commands(&self, mode: Mode) -> Vec<(&str, &str)> {
        self.modes
            .get(&mode)
            .map(|t| t.values().map(|c| (c.name(), c.description())).collect())
            .unwrap_or_default()
    }

    /// Names reachable in `mode` that start with `partial` (case-sensitive),
    /// sorted and deduplicated.
    pub fn completions(&self, partial: &str, mode: Mode) -> Vec<String> {
        let mode_names = self.modes.get(&mode).into_iter().flat_map(|t| t.keys());
        let mut out: Vec<String> = self
            .global
            .keys()
            .chain(mode_names)
            .filter(|name| name.starts_with(partial))
            .cloned()
            .collect();
        out.sort();
        out.dedup();
        out
    }
}
