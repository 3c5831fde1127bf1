//! # Partition Locking
//!
//! Guards the read-modify-write window of a partition update.
//!
//! Uses both:
//! 1. OS-level file locking (via fs2) for process safety
//! 2. A `.lock` sidecar with holder metadata for operator visibility
//!
//! The lock serialises writers on one partition file only. It is not an
//! optimistic-concurrency check: the last completed write wins.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::errors::{DesignError, DesignResult};

/// Locks older than this are considered abandoned
const STALE_AFTER_MINUTES: i64 = 10;

/// Lock holder metadata stored in `.lock` files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// Operating system user holding the lock
    pub user_id: String,
    /// Machine name where lock was acquired
    pub machine: String,
    /// Process ID that holds the lock
    pub pid: u32,
    /// When the lock was acquired
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    /// Lock info for the current process
    pub fn current() -> Self {
        LockInfo {
            user_id: whoami::username(),
            machine: whoami::fallible::hostname().unwrap_or_else(|_| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }

    fn is_stale(&self) -> bool {
        if self.pid == std::process::id() {
            return false;
        }
        #[cfg(unix)]
        {
            let same_machine = whoami::fallible::hostname()
                .map(|host| host == self.machine)
                .unwrap_or(false);
            if same_machine && fs::metadata(format!("/proc/{}", self.pid)).is_err() {
                return true;
            }
        }
        (Utc::now() - self.locked_at).num_minutes() > STALE_AFTER_MINUTES
    }
}

/// Exclusive partition lock, released when dropped.
pub struct PartitionLock {
    lock_path: PathBuf,
    _lock_file: File,
    pub info: LockInfo,
}

impl PartitionLock {
    /// Acquire an exclusive lock on a partition file.
    ///
    /// # Returns
    ///
    /// * `Ok(PartitionLock)` - Lock acquired
    /// * `Err(DesignError::StoreLocked)` - Another live process holds the lock
    /// * `Err(DesignError::StoreUnavailable)` - The lock file could not be written
    pub fn acquire(partition_path: &Path) -> DesignResult<Self> {
        let lock_path = lock_path_for(partition_path);
        let location = partition_path.display().to_string();

        if let Some(existing) = read_lock_info(&lock_path) {
            if !existing.is_stale() {
                return Err(DesignError::store_locked(
                    location,
                    format!("{} ({})", existing.user_id, existing.machine),
                    existing.locked_at.to_rfc3339(),
                ));
            }
        }

        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| {
                DesignError::store_unavailable("create lock", lock_path.display().to_string(), e.to_string())
            })?;

        lock_file
            .try_lock_exclusive()
            .map_err(|_| DesignError::store_locked(location.as_str(), "another process", "unknown"))?;

        let info = LockInfo::current();
        let lock_json = serde_json::to_string_pretty(&info).map_err(|e| DesignError::SerializationError {
            reason: e.to_string(),
        })?;
        lock_file.write_all(lock_json.as_bytes()).map_err(|e| {
            DesignError::store_unavailable("write lock", lock_path.display().to_string(), e.to_string())
        })?;
        lock_file.sync_all().map_err(|e| {
            DesignError::store_unavailable("sync lock", lock_path.display().to_string(), e.to_string())
        })?;

        Ok(PartitionLock {
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Current holder of a partition lock, if any live one exists.
    pub fn check(partition_path: &Path) -> Option<LockInfo> {
        read_lock_info(&lock_path_for(partition_path)).filter(|info| !info.is_stale())
    }
}

impl Drop for PartitionLock {
    fn drop(&mut self) {
        // OS lock is released when _lock_file is dropped
        let _ = fs::remove_file(&self.lock_path);
    }
}

fn lock_path_for(partition_path: &Path) -> PathBuf {
    let mut lock_path = partition_path.to_path_buf();
    let extension = lock_path
        .extension()
        .map(|e| format!("{}.lock", e.to_string_lossy()))
        .unwrap_or_else(|| "lock".to_string());
    lock_path.set_extension(extension);
    lock_path
}

fn read_lock_info(lock_path: &Path) -> Option<LockInfo> {
    let mut contents = String::new();
    File::open(lock_path).ok()?.read_to_string(&mut contents).ok()?;
    serde_json::from_str(&contents).ok()
}
