//! Foundation types for devterm.
//!
//! Shared by every devterm crate: the error enums, the TOML-backed terminal
//! configuration, and the platform-agnostic input events the console host
//! feeds into the shell.

pub mod config;
pub mod error;
pub mod input;
