//! Terminal configuration loaded from `devterm.toml`.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{DevtermError, Result};

/// Host-level settings for a devterm session.
///
/// Every field has a default, so an empty file (or no file at all) yields a
/// working configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    /// JSON file backing the persistent key/value store.
    pub state_file: PathBuf,
    /// Mode used when no valid mode was persisted by a previous session.
    pub default_mode: String,
    /// User name shown in the prompt.
    pub user: String,
    /// Host name shown in the prompt.
    pub hostname: String,
    /// Directory the session starts in, and the target of a bare `cd`.
    pub home: String,
    /// Polling interval for market price alerts.
    pub alert_interval_secs: u64,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            state_file: PathBuf::from("devterm-state.json"),
            default_mode: "dev".to_string(),
            user: "user".to_string(),
            hostname: "pro-sys".to_string(),
            home: "/home/user".to_string(),
            alert_interval_secs: 10,
        }
    }
}

impl TerminalConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| DevtermError::Config(format!("devterm.toml: {e}")))
    }

    /// Load a configuration file. A missing file yields the defaults; an
    /// unreadable or malformed file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        let cfg = TerminalConfig::from_toml("").unwrap();
        assert_eq!(cfg, TerminalConfig::default());
    }

    #[test]
    fn partial_override() {
        let cfg = TerminalConfig::from_toml(
            r#"
default_mode = "fs"
hostname = "lab"
"#,
        )
        .unwrap();
        assert_eq!(cfg.default_mode, "fs");
        assert_eq!(cfg.hostname, "lab");
        assert_eq!(cfg.user, "user");
        assert_eq!(cfg.home, "/home/user");
        assert_eq!(cfg.alert_interval_secs, 10);
    }

    #[test]
    fn state_file_is_a_path() {
        let cfg = TerminalConfig::from_toml("state_file = \"/tmp/dt.json\"").unwrap();
        assert_eq!(cfg.state_file, PathBuf::from("/tmp/dt.json"));
    }

    #[test]
    fn malformed_toml_is_config_error() {
        let err = TerminalConfig::from_toml("default_mode = [").unwrap_err();
        assert!(matches!(err, DevtermError::Config(_)));
        assert!(err.to_string().contains("devterm.toml"));
    }

    #[test]
    fn wrong_type_is_config_error() {
        let err = TerminalConfig::from_toml("alert_interval_secs = \"soon\"").unwrap_err();
        assert!(matches!(err, DevtermError::Config(_)));
    }

    #[test]
    fn load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = TerminalConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg, TerminalConfig::default());
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devterm.toml");
        std::fs::write(&path, "user = \"ada\"\n").unwrap();
        let cfg = TerminalConfig::load(&path).unwrap();
        assert_eq!(cfg.user, "ada");
    }
}
