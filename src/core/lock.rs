//! Working directory lock
//!
//! Provides exclusive locking so two preparation runs never race on the
//! same working directory. The lock file itself is left in place; only the
//! advisory lock on it matters, and the OS drops that when the owning
//! process exits, however it exits.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::Path;

pub const LOCK_FILE_NAME: &str = ".source-prep.lock";

/// Acquire an exclusive lock on the working directory.
/// Returns a guard that releases the lock when dropped.
pub fn acquire_workdir_lock(workdir: &Path) -> Result<WorkdirLock> {
    let lock_path = workdir.join(LOCK_FILE_NAME);

    // Never unlink or truncate here: another run may hold this very inode.
    let lock_file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&lock_path)
        .with_context(|| format!("Failed to open lock file: {}", lock_path.display()))?;

    if lock_file.try_lock_exclusive().is_err() {
        anyhow::bail!(
            "Another source-prep run is active in '{}' (holding '{}')",
            workdir.display(),
            lock_path.display()
        );
    }

    Ok(WorkdirLock { file: lock_file })
}

/// RAII guard for the working directory lock
#[derive(Debug)]
pub struct WorkdirLock {
    file: File,
}

impl Drop for WorkdirLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
