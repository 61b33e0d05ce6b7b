//! Persistent key-value store behind the conversation repository.
//!
//! Reads and writes are synchronous; durability is best-effort and the
//! repository is the sole writer. Two implementations: an in-memory map
//! for tests and ephemeral sessions, and a one-file-per-key store on disk.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use directories::BaseDirs;

/// Durable key-value storage for serialized application state.
pub trait StateStore: Send {
    /// Read the value stored under `key`, or `None` if nothing is stored.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`, replacing any previous value.
    fn put(&self, key: &str, value: &str) -> Result<()>;
}

// ============================================================================
// MemoryStateStore
// ============================================================================

/// In-memory store; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStateStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ============================================================================
// FileStateStore
// ============================================================================

/// On-disk store keeping each key in its own `{key}.json` file under a
/// base directory.
#[derive(Debug)]
pub struct FileStateStore {
    base_dir: PathBuf,
}

impl FileStateStore {
    /// Create a store rooted at `base_dir`, creating the directory if
    /// needed.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)
            .with_context(|| format!("failed to create state directory {}", base_dir.display()))?;
        Ok(FileStateStore { base_dir })
    }

    /// Create a store at the platform data directory.
    pub fn default_location() -> Result<Self> {
        let base = BaseDirs::new()
            .context("could not determine platform data directory")?
            .data_dir()
            .join("aps-assistant");
        Self::new(base)
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{key}.json"))
    }
}

impl StateStore for FileStateStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => {
                Err(err).with_context(|| format!("failed to read state file {}", path.display()))
            }
        }
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        fs::write(&path, value)
            .with_context(|| format!("failed to write state file {}", path.display()))
    }
}
