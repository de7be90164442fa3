//! Storage collaborator for settings files.
//!
//! The firmware keeps its JSON settings at fixed paths on whatever medium is
//! mounted (SD card or internal flash). The core only needs read/write-text
//! by path, so that capability sits behind a trait.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Read/write-text-by-path capability.
///
/// Failures are reported through the return values (`write` → false, `read` →
/// empty string), matching how the storage backend surfaces them; callers
/// distinguish "no file" from "empty file" with `exists`.
pub trait Storage: Send + Sync {
    /// Returns true if a file exists at `path`.
    fn exists(&self, path: &str) -> bool;

    /// Reads the full text of the file at `path`, or an empty string when the
    /// file is missing or unreadable.
    fn read(&self, path: &str) -> String;

    /// Writes `content` to `path`, replacing any existing file.
    fn write(&self, path: &str, content: &str) -> bool;
}

/// Filesystem-backed storage rooted at a directory.
///
/// Settings paths like `/settings/animations.json` resolve relative to the
/// root, so the firmware's absolute medium paths map onto any host directory.
pub struct DirStorage {
    root: PathBuf,
}

impl DirStorage {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

impl Storage for DirStorage {
    fn exists(&self, path: &str) -> bool {
        self.resolve(path).exists()
    }

    fn read(&self, path: &str) -> String {
        let full = self.resolve(path);
        match fs::read_to_string(&full) {
            Ok(content) => content,
            Err(e) => {
                tracing::debug!("Could not read {:?}: {}", full, e);
                String::new()
            }
        }
    }

    fn write(&self, path: &str, content: &str) -> bool {
        let full = self.resolve(path);
        if let Some(parent) = full.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                tracing::error!("Could not create {:?}: {}", parent, e);
                return false;
            }
        }
        match fs::write(&full, content) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Could not write {:?}: {}", full, e);
                false
            }
        }
    }
}

/// In-memory storage, useful for tests and for running without a mounted
/// medium.
#[derive(Default)]
pub struct MemoryStorage {
    files: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn exists(&self, path: &str) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    fn read(&self, path: &str) -> String {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or_default()
    }

    fn write(&self, path: &str, content: &str) -> bool {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), content.to_string());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_dir_storage_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let storage = DirStorage::new(temp_dir.path());

        assert!(!storage.exists("/settings/test.json"));
        assert!(storage.write("/settings/test.json", "{\"a\":1}"));
        assert!(storage.exists("/settings/test.json"));
        assert_eq!(storage.read("/settings/test.json"), "{\"a\":1}");
    }

    #[test]
    fn test_dir_storage_missing_file_reads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let storage = DirStorage::new(temp_dir.path());
        assert_eq!(storage.read("/settings/nope.json"), "");
    }

    #[test]
    fn test_memory_storage_round_trip() {
        let storage = MemoryStorage::new();
        assert!(!storage.exists("/settings/test.json"));
        assert!(storage.write("/settings/test.json", "content"));
        assert!(storage.exists("/settings/test.json"));
        assert_eq!(storage.read("/settings/test.json"), "content");
    }
}
