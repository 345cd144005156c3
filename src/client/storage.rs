//! The single client-side storage abstraction.
//!
//! Everything the client persists (auth token, cached journal state) goes
//! through one [`Storage`] handle that is constructed once and injected.
//! [`default_storage`] probes whether the disk location is writable and
//! silently falls back to an in-memory store when it is not.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// Volatile store; state is lost when the process exits.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }
}

/// One file per key under a directory.
pub struct DiskStorage {
    dir: PathBuf,
}

impl DiskStorage {
    /// Open the directory, creating it if needed, and probe that it is
    /// actually writable. Returns None when it is not, so callers can fall
    /// back to memory instead of failing every later write.
    pub fn open(dir: impl Into<PathBuf>) -> Option<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).ok()?;

        let probe = dir.join(".probe");
        fs::write(&probe, b"ok").ok()?;
        let _ = fs::remove_file(&probe);

        Some(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys are simple identifiers; guard against path traversal anyway.
        let safe: String = key
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(safe)
    }
}

impl Storage for DiskStorage {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&self, key: &str, value: &str) {
        if let Err(e) = fs::write(self.path_for(key), value) {
            tracing::warn!(key = %key, error = %e, "Failed to persist client state");
        }
    }

    fn remove(&self, key: &str) {
        let _ = fs::remove_file(self.path_for(key));
    }
}

/// Disk-backed storage when the directory is usable, in-memory otherwise.
pub fn default_storage(dir: impl Into<PathBuf>) -> Box<dyn Storage> {
    match DiskStorage::open(dir) {
        Some(disk) => Box::new(disk),
        None => {
            tracing::warn!("Storage directory unavailable, falling back to in-memory storage");
            Box::new(MemoryStorage::new())
        }
    }
}
