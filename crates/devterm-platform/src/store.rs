//! Persistent key/value store.
//!
//! Session state (the filesystem document, mode, presentation settings,
//! notes, tasks, blackjack balance) survives restarts through a small string
//! store. Writes are best-effort: a failing backend is logged and the session
//! carries on with its in-memory state.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use devterm_types::error::Result;

/// Well-known store keys.
pub mod keys {
    pub const FS: &str = "fs";
    pub const MODE: &str = "mode";
    pub const FONT: &str = "font";
    pub const COLOR: &str = "color";
    pub const THEME: &str = "theme";
    pub const NOTES: &str = "notes";
    pub const TASKS: &str = "tasks";
    pub const BLACKJACK_BALANCE: &str = "blackjack-balance";
}

/// String-keyed, string-valued storage backend.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// Volatile store, used by tests and when no state file is configured.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FileStore
// ---------------------------------------------------------------------------

/// Store backed by a single JSON object on disk.
///
/// The whole map is rewritten on every change (temp file then rename).
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open `path`, starting empty when the file does not exist.
    ///
    /// An unreadable or malformed file is reported and replaced by an empty
    /// store so the session can still start.
    pub fn open(path: &Path) -> Self {
        let entries = match std::fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(map) => map,
                Err(e) => {
                    log::warn!("Ignoring malformed state file {}: {e}", path.display());
                    BTreeMap::new()
                },
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                log::warn!("Cannot read state file {}: {e}", path.display());
                BTreeMap::new()
            },
        };
        log::debug!("Opened state file {} ({} keys)", path.display(), entries.len());
        Self {
            path: path.to_path_buf(),
            entries,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Persistence handle
// ---------------------------------------------------------------------------

/// Shared, clonable handle over a [`KeyValueStore`].
///
/// The filesystem tree and the command handlers each hold one; all clones
/// see the same backend.
#[derive(Clone)]
pub struct Persistence {
    inner: Rc<RefCell<Box<dyn KeyValueStore>>>,
}

impl std::fmt::Debug for Persistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persistence").finish_non_exhaustive()
    }
}

impl Persistence {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Box::new(store))),
        }
    }

    /// Handle over a fresh [`MemoryStore`].
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// Read a raw value. Backend failures read as absent.
    pub fn get(&self, key: &str) -> Option<String> {
        match self.inner.borrow().get(key) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("store read '{key}' failed: {e}");
                None
            },
        }
    }

    /// Write a raw value. Failures are logged, never returned.
    pub fn set(&self, key: &str, value: &str) {
        if let Err(e) = self.inner.borrow_mut().set(key, value) {
            log::warn!("store write '{key}' failed: {e}");
        }
    }

    pub fn remove(&self, key: &str) {
        if let Err(e) = self.inner.borrow_mut().remove(key) {
            log::warn!("store remove '{key}' failed: {e}");
        }
    }

    /// Read and decode a JSON value. A malformed value is logged and treated
    /// as absent.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(v) => Some(v),
            Err(e) => {
                log::warn!("store value '{key}' is malformed: {e}");
                None
            },
        }
    }

    /// Encode and write a JSON value.
    pub fn set_json<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => self.set(key, &json),
            Err(e) => log::warn!("store value '{key}' not serializable: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devterm_types::error::DevtermError;

    /// Backend that rejects every write.
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(DevtermError::Store("offline".into()))
        }
        fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(DevtermError::Store("read-only".into()))
        }
        fn remove(&mut self, _key: &str) -> Result<()> {
            Err(DevtermError::Store("read-only".into()))
        }
    }

    #[test]
    fn memory_set_get_remove() {
        let mut s = MemoryStore::new();
        assert_eq!(s.get("mode").unwrap(), None);
        s.set("mode", "fs").unwrap();
        assert_eq!(s.get("mode").unwrap().as_deref(), Some("fs"));
        s.remove("mode").unwrap();
        assert_eq!(s.get("mode").unwrap(), None);
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        {
            let mut s = FileStore::open(&path);
            s.set(keys::THEME, "dracula").unwrap();
            s.set(keys::MODE, "crypto").unwrap();
        }
        let s = FileStore::open(&path);
        assert_eq!(s.get(keys::THEME).unwrap().as_deref(), Some("dracula"));
        assert_eq!(s.get(keys::MODE).unwrap().as_deref(), Some("crypto"));
        assert_eq!(s.path(), path.as_path());
    }

    #[test]
    fn file_store_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/state.json");
        let mut s = FileStore::open(&path);
        s.set("k", "v").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn file_store_malformed_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{not json").unwrap();
        let s = FileStore::open(&path);
        assert_eq!(s.get("fs").unwrap(), None);
    }

    #[test]
    fn file_store_remove_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let mut s = FileStore::open(&path);
        s.set("notes", "[]").unwrap();
        s.remove("notes").unwrap();
        let s = FileStore::open(&path);
        assert_eq!(s.get("notes").unwrap(), None);
    }

    #[test]
    fn persistence_clones_share_backend() {
        let a = Persistence::in_memory();
        let b = a.clone();
        a.set("color", "pink");
        assert_eq!(b.get("color").as_deref(), Some("pink"));
        b.remove("color");
        assert_eq!(a.get("color"), None);
    }

    #[test]
    fn persistence_json_helpers() {
        let p = Persistence::in_memory();
        p.set_json(keys::NOTES, &vec!["a".to_string(), "b".to_string()]);
        let notes: Vec<String> = p.get_json(keys::NOTES).unwrap();
        assert_eq!(notes, vec!["a", "b"]);
    }

    #[test]
    fn persistence_malformed_json_reads_absent() {
        let p = Persistence::in_memory();
        p.set(keys::TASKS, "[[[");
        let tasks: Option<Vec<String>> = p.get_json(keys::TASKS);
        assert!(tasks.is_none());
    }

    #[test]
    fn persistence_swallows_backend_failures() {
        let p = Persistence::new(BrokenStore);
        p.set("mode", "dev");
        p.remove("mode");
        assert_eq!(p.get("mode"), None);
    }
}
