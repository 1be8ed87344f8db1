//! Durable storage for the serialized frequency store.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::{Error, Result};

/// Where the serialized store lives.
///
/// Reads and writes are synchronous; a successful `write` means the new
/// contents are durable.
pub trait StateBackend: Send + Sync {
    /// Read the stored document, `None` if nothing has been stored yet.
    fn read(&self) -> Result<Option<String>>;

    /// Replace the stored document.
    fn write(&self, contents: &str) -> Result<()>;

    /// Human readable location, used in logs.
    fn describe(&self) -> String;
}

/// JSON document on the local filesystem.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateBackend for JsonFileBackend {
    fn read(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::io(&self.path, e)),
        }
    }

    fn write(&self, contents: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        fs::write(&self.path, contents).map_err(|e| Error::io(&self.path, e))?;

        debug!("Wrote {} bytes to {}", contents.len(), self.path.display());
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory document shared between clones.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    contents: Arc<Mutex<Option<String>>>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that starts out holding `contents`.
    #[must_use]
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Arc::new(Mutex::new(Some(contents.into()))),
        }
    }

    /// Snapshot of the currently stored document.
    #[must_use]
    pub fn contents(&self) -> Option<String> {
        self.contents
            .lock()
            .map_or_else(|poisoned| poisoned.into_inner().clone(), |guard| guard.clone())
    }
}

impl StateBackend for MemoryBackend {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.contents())
    }

    fn write(&self, contents: &str) -> Result<()> {
        let mut guard = self
            .contents
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard = Some(contents.to_string());
        Ok(())
    }

    fn describe(&self) -> String {
        "<memory>".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("absent.json"));
        assert!(backend.read().unwrap().is_none());
    }

    #[test]
    fn write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");
        let backend = JsonFileBackend::new(&path);

        backend.write("{}").unwrap();

        assert_eq!(backend.read().unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn write_into_a_file_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let backend = JsonFileBackend::new(blocker.join("state.json"));

        assert!(matches!(backend.write("{}"), Err(Error::Io { .. })));
    }

    #[test]
    fn memory_backend_clones_share_contents() {
        let backend = MemoryBackend::new();
        let clone = backend.clone();
        backend.write("hello").unwrap();
        assert_eq!(clone.contents().as_deref(), Some("hello"));
    }
}
