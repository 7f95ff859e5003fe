//! Filesystem primitives
//!
//! The central piece is [`ReplaceDir`]: content is staged next to the
//! destination and only swapped in on [`ReplaceDir::commit`]. Dropping the
//! guard without committing removes the staging directory and leaves the old
//! destination untouched.

use std::io;
use std::path::{Component, Path, PathBuf};
use tempfile::TempDir;

/// Prefix of staging directories created next to a destination.
pub const STAGING_PREFIX: &str = ".source-prep-staging-";

/// Ensure a file's parent directory exists.
pub fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Remove whatever is at `path` (file, symlink or directory tree).
///
/// A missing path is not an error.
pub fn remove_path(path: &Path) -> io::Result<()> {
    match std::fs::symlink_metadata(path) {
        Ok(md) if md.is_dir() => std::fs::remove_dir_all(path),
        Ok(_) => std::fs::remove_file(path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Move a file to `dest`, replacing anything already there and creating
/// parent directories as needed.
pub fn move_file(src: &Path, dest: &Path) -> io::Result<()> {
    remove_path(dest)?;
    ensure_parent_dir(dest)?;
    if std::fs::rename(src, dest).is_err() {
        // Cross-device moves cannot rename.
        std::fs::copy(src, dest)?;
        std::fs::remove_file(src)?;
    }
    Ok(())
}

/// Check if path is safe (no path traversal).
///
/// Rejects absolute paths and paths containing "..".
pub fn is_safe_path(path: &Path) -> bool {
    !path.as_os_str().is_empty()
        && !path.is_absolute()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Remove staging directories left behind by an interrupted run.
///
/// Returns how many were removed.
pub fn sweep_stale_staging(dir: &Path) -> io::Result<usize> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };

    let mut removed = 0;
    for entry in entries {
        let entry = entry?;
        if entry.file_name().to_string_lossy().starts_with(STAGING_PREFIX) {
            remove_path(&entry.path())?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// Scoped destructive replace of a directory.
#[derive(Debug)]
pub struct ReplaceDir {
    staging: TempDir,
    destination: PathBuf,
}

impl ReplaceDir {
    /// Create an empty staging directory in the destination's parent.
    pub fn new(destination: &Path) -> io::Result<Self> {
        let parent = match destination.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)?;
        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(parent)?;
        Ok(Self {
            staging,
            destination: destination.to_path_buf(),
        })
    }

    /// Where new content should be written.
    pub fn path(&self) -> &Path {
        self.staging.path()
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Remove the old destination and move the staged tree into its place.
    ///
    /// The destination is absent only between those two steps. If the rename
    /// fails the staging directory is still cleaned up on drop.
    pub fn commit(self) -> io::Result<PathBuf> {
        remove_path(&self.destination)?;
        std::fs::rename(self.staging.path(), &self.destination)?;
        // `self.staging` now points at a path that no longer exists; its drop
        // is a no-op.
        Ok(self.destination)
    }
}
