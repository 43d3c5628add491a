//! Command interpreter and terminal subsystem.
//!
//! The terminal is a registry-based dispatch system. Commands implement the
//! `Command` trait and are registered by name, either globally or under one
//! [`Mode`]. The [`Shell`] owns the session, the filesystem, and the
//! services, serializes submitted lines through a queue, and renders each
//! command's output to a [`DisplaySink`].

pub mod blackjack;
mod commands;
mod dev_commands;
pub mod display;
mod file_commands;
mod fun_commands;
mod interpreter;
mod market_commands;
mod network_commands;
pub mod presentation;
pub mod rng;
pub mod scheduler;
pub mod session;
pub mod shell;
pub mod snake;
mod tool_commands;

#[cfg(test)]
mod test_support;

/// Register every builtin command set into a registry.
pub use commands::register_builtins;
/// Output sinks: the trait the host implements plus an in-memory buffer.
pub use display::{BufferDisplay, DisplaySink};
pub use interpreter::{
    Command, CommandOutput, CommandRegistry, Environment, OutputLine, Program, StyleTag,
};
pub use session::{Mode, Profile, SessionState};
pub use shell::{Completion, Services, Shell};
