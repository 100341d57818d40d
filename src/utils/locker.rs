//! File-based locking to prevent concurrent sweeps of the same store

use anyhow::{Context, Result};
use fd_lock::{RwLock, RwLockWriteGuard};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Per-store lock file. Open it once, then take the exclusive guard for the
/// duration of the sweep; the guard borrows the lock, so both stay in the
/// caller's scope.
pub struct SweepLock {
    store_name: String,
    lock: RwLock<File>,
    lock_path: PathBuf,
}

impl SweepLock {
    /// Open (creating if needed) the lock file for a store.
    pub fn open(store_name: &str) -> Result<Self> {
        let lock_path = Self::lock_path(store_name);

        debug!("Opening lock file: {:?}", lock_path);

        if let Some(parent) = lock_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create lock directory")?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&lock_path)
            .context(format!("Failed to open lock file: {:?}", lock_path))?;

        Ok(Self {
            store_name: store_name.to_string(),
            lock: RwLock::new(file),
            lock_path,
        })
    }

    /// Take the exclusive lock without blocking.
    /// Fails if another sweep of the same store is running.
    pub fn try_exclusive(&mut self) -> Result<RwLockWriteGuard<'_, File>> {
        let guard = self.lock.try_write().with_context(|| {
            format!(
                "Store '{}' is already being swept (lock held)",
                self.store_name
            )
        })?;

        info!("Acquired sweep lock for store: {}", self.store_name);
        Ok(guard)
    }

    /// Get the lock file path for a store.
    fn lock_path(store_name: &str) -> PathBuf {
        #[cfg(unix)]
        let base = Path::new("/tmp");

        #[cfg(windows)]
        let base = std::env::temp_dir();

        base.join(format!("backup-sweeper-{}.lock", store_name))
    }

    /// Get the lock file path (for cleanup or inspection)
    #[allow(dead_code)]
    pub fn path(&self) -> &Path {
        &self.lock_path
    }
}

impl Drop for SweepLock {
    fn drop(&mut self) {
        info!("Released sweep lock: {:?}", self.lock_path);

        // Best effort removal.
        if let Err(e) = std::fs::remove_file(&self.lock_path) {
            debug!("Failed to remove lock file: {}", e);
        }
    }
}
