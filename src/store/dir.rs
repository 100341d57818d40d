//! Filesystem-backed object store
//!
//! Treats a directory tree as a flat key space: every regular file below the
//! root is a key, named by its `/`-separated relative path.

use super::ObjectStore;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Object store over a local directory of backup artifacts.
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collect_keys(&self, dir: &Path, keys: &mut Vec<String>) -> Result<()> {
        let entries = fs::read_dir(dir)
            .with_context(|| format!("Failed to read directory: {:?}", dir))?;

        for entry in entries {
            let entry = entry.with_context(|| format!("Failed to read entry in {:?}", dir))?;
            let path = entry.path();

            if path.is_dir() {
                self.collect_keys(&path, keys)?;
            } else if path.is_file() {
                let relative = path
                    .strip_prefix(&self.root)
                    .expect("entry is always below the root");
                // Keys use forward slashes regardless of platform.
                let key = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                keys.push(key);
            }
        }

        Ok(())
    }
}

impl ObjectStore for DirStore {
    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            anyhow::bail!("Store root does not exist: {:?}", self.root);
        }

        let mut keys = Vec::new();
        self.collect_keys(&self.root, &mut keys)?;
        keys.retain(|k| k.starts_with(prefix));
        keys.sort();

        debug!("Listed {} keys under prefix '{}'", keys.len(), prefix);
        Ok(keys)
    }

    fn delete(&self, key: &str) -> Result<()> {
        let path = self.root.join(key);

        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            // Already gone: treat as success, deletions are idempotent.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Key already absent: {}", key);
                Ok(())
            }
            Err(e) => Err(e).with_context(|| format!("Failed to delete key: {}", key)),
        }
    }
}
