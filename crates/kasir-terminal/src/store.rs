//! # Session Persistence Backends
//!
//! The terminal survives restarts: cart and device configuration are
//! written out on every mutation and read back on startup. The blob is
//! opaque JSON; backends only move bytes.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use directories::ProjectDirs;
use tracing::debug;

use crate::error::TerminalError;

/// Storage for the serialized terminal session.
pub trait TerminalStore: Send + Sync {
    /// Loads the stored blob, `None` when nothing was ever saved.
    fn load(&self) -> Result<Option<String>, TerminalError>;

    /// Persists the blob, replacing any previous one.
    fn save(&self, blob: &str) -> Result<(), TerminalError>;
}

// =============================================================================
// JSON File Store
// =============================================================================

/// File-backed store under the OS-conventional data directory
/// (e.g. `~/.local/share/kasir-pos/session.json` on Linux).
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store at the platform's data directory for the app.
    pub fn new() -> Result<Self, TerminalError> {
        let dirs = ProjectDirs::from("id", "kasir", "kasir-pos").ok_or_else(|| {
            TerminalError::Storage("no home directory for session storage".to_string())
        })?;
        Ok(JsonFileStore {
            path: dirs.data_dir().join("session.json"),
        })
    }

    /// Store at an explicit path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl TerminalStore for JsonFileStore {
    fn load(&self) -> Result<Option<String>, TerminalError> {
        match fs::read_to_string(&self.path) {
            Ok(blob) => Ok(Some(blob)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(TerminalError::Storage(err.to_string())),
        }
    }

    fn save(&self, blob: &str) -> Result<(), TerminalError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| TerminalError::Storage(e.to_string()))?;
        }

        // Write-then-rename so a crash mid-save never truncates the session
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, blob).map_err(|e| TerminalError::Storage(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| TerminalError::Storage(e.to_string()))?;

        debug!(path = %self.path.display(), "Session persisted");
        Ok(())
    }
}

// =============================================================================
// In-Memory Store
// =============================================================================

/// Volatile store for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blob: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl TerminalStore for MemoryStore {
    fn load(&self) -> Result<Option<String>, TerminalError> {
        Ok(self
            .blob
            .lock()
            .map_err(|_| TerminalError::Storage("session store poisoned".to_string()))?
            .clone())
    }

    fn save(&self, blob: &str) -> Result<(), TerminalError> {
        *self
            .blob
            .lock()
            .map_err(|_| TerminalError::Storage("session store poisoned".to_string()))? =
            Some(blob.to_string());
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
