//! Archive materialization
//!
//! Extracts a zip into a destination directory through [`ReplaceDir`], so the
//! destination is replaced wholesale and never merged with an older revision.
//! Archives produced by source hosts wrap everything in one
//! `<repo>-<revision>/` directory; `strip_root` discards it.

use super::fs_utils::{self, ReplaceDir};
use super::progress::{self, ProgressGuard};
use crate::artifact::Relocation;
use crate::core::error::PrepError;
use crate::core::output;
use std::fs::File;
use std::path::{Component, Path, PathBuf};

/// One archive entry after path sanitization and root stripping.
struct Entry {
    index: usize,
    relative: PathBuf,
    is_dir: bool,
}

/// Extract `archive` into `destination`, replacing whatever was there.
///
/// Returns the extracted file paths (directories excluded), sorted.
pub fn materialize(
    artifact: &str,
    archive: &Path,
    destination: &Path,
    strip_root: bool,
) -> Result<Vec<PathBuf>, PrepError> {
    let filename = archive
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "archive".to_string());

    let pb = progress::create_spinner(&format!("extracting {}", filename));
    let _guard = ProgressGuard::new(&pb);

    let replace = ReplaceDir::new(destination)
        .map_err(|e| PrepError::fs(artifact, "extract", destination, e))?;
    let mut files = extract_zip(artifact, archive, replace.path(), strip_root)?;
    replace
        .commit()
        .map_err(|e| PrepError::fs(artifact, "replace", destination, e))?;

    for file in files.iter_mut() {
        *file = destination.join(&*file);
    }
    files.sort();

    output::detail(&format!(
        "extracted {} ({} files) to {}",
        filename,
        files.len(),
        destination.display()
    ));
    Ok(files)
}

/// Move the requested files out of `scratch` into `workdir`, then remove
/// `scratch` entirely.
///
/// Every pair is checked before the first move, so a bad pair leaves both
/// `workdir` and `scratch` as they were. Returns the relocated destination
/// paths in declaration order.
pub fn relocate(
    artifact: &str,
    scratch: &Path,
    relocations: &[Relocation<'_>],
    workdir: &Path,
) -> Result<Vec<PathBuf>, PrepError> {
    let mut planned = Vec::with_capacity(relocations.len());
    for relocation in relocations {
        let (source, destination) = (Path::new(relocation.source), Path::new(relocation.destination));
        for path in [source, destination] {
            if !fs_utils::is_safe_path(path) {
                return Err(PrepError::fs(
                    artifact,
                    "relocate",
                    path,
                    std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        "relocation path must be relative and stay inside its root",
                    ),
                ));
            }
        }

        let from = scratch.join(source);
        if !from.is_file() {
            return Err(PrepError::fs(
                artifact,
                "relocate",
                &from,
                std::io::Error::new(std::io::ErrorKind::NotFound, "file not present in archive"),
            ));
        }
        planned.push((relocation, from, workdir.join(destination)));
    }

    let mut moved = Vec::with_capacity(planned.len());
    for (relocation, from, to) in planned {
        fs_utils::move_file(&from, &to).map_err(|e| PrepError::fs(artifact, "relocate", &to, e))?;
        output::detail(&format!("{} -> {}", relocation.source, relocation.destination));
        moved.push(to);
    }

    fs_utils::remove_path(scratch).map_err(|e| PrepError::fs(artifact, "cleanup", scratch, e))?;
    Ok(moved)
}

/// Drop the first path component. `None` if nothing remains.
fn strip_first_component(path: &Path) -> Option<PathBuf> {
    let mut components = path.components();
    components.next()?;
    let rest: PathBuf = components.collect();
    (!rest.as_os_str().is_empty()).then_some(rest)
}

fn first_component(path: &Path) -> Option<&std::ffi::OsStr> {
    match path.components().next() {
        Some(Component::Normal(name)) => Some(name),
        _ => None,
    }
}

/// Read entry names, reject unsafe ones and apply root stripping.
fn plan_entries<R: std::io::Read + std::io::Seek>(
    artifact: &str,
    archive: &mut zip::ZipArchive<R>,
    strip_root: bool,
) -> Result<Vec<Entry>, PrepError> {
    let mut raw = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let file = archive
            .by_index(index)
            .map_err(|e| PrepError::archive(artifact, format!("zip entry error: {}", e)))?;
        let path = file.enclosed_name().ok_or_else(|| {
            PrepError::archive(artifact, format!("zip contains unsafe path: {}", file.name()))
        })?;
        raw.push((index, path, file.is_dir()));
    }

    if !strip_root {
        return Ok(raw
            .into_iter()
            .filter(|(_, path, _)| !path.as_os_str().is_empty())
            .map(|(index, relative, is_dir)| Entry {
                index,
                relative,
                is_dir,
            })
            .collect());
    }

    let root = raw
        .first()
        .and_then(|(_, path, _)| first_component(path))
        .map(|c| c.to_os_string())
        .ok_or_else(|| PrepError::archive(artifact, "archive is empty"))?;

    let mut entries = Vec::with_capacity(raw.len());
    for (index, path, is_dir) in raw {
        if first_component(&path) != Some(root.as_os_str()) {
            return Err(PrepError::archive(
                artifact,
                format!(
                    "entries are not wrapped in a single root directory ({} is outside {})",
                    path.display(),
                    Path::new(&root).display()
                ),
            ));
        }
        match strip_first_component(&path) {
            Some(relative) => entries.push(Entry {
                index,
                relative,
                is_dir,
            }),
            // The root directory entry itself.
            None if is_dir => {}
            None => {
                return Err(PrepError::archive(
                    artifact,
                    format!("top-level file {} cannot be root-stripped", path.display()),
                ));
            }
        }
    }
    Ok(entries)
}

/// Extract a zip archive into `dest`, returning file paths relative to it.
fn extract_zip(
    artifact: &str,
    archive_path: &Path,
    dest: &Path,
    strip_root: bool,
) -> Result<Vec<PathBuf>, PrepError> {
    let file = File::open(archive_path)
        .map_err(|e| PrepError::fs(artifact, "extract", archive_path, e))?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| PrepError::archive(artifact, format!("zip read error: {}", e)))?;

    let entries = plan_entries(artifact, &mut archive, strip_root)?;
    let mut files = Vec::new();

    for entry in entries {
        let outpath = dest.join(&entry.relative);

        if entry.is_dir {
            std::fs::create_dir_all(&outpath)
                .map_err(|e| PrepError::fs(artifact, "extract", &outpath, e))?;
            continue;
        }

        fs_utils::ensure_parent_dir(&outpath)
            .map_err(|e| PrepError::fs(artifact, "extract", &outpath, e))?;

        let mut zipped = archive
            .by_index(entry.index)
            .map_err(|e| PrepError::archive(artifact, format!("zip entry error: {}", e)))?;
        let mut outfile =
            File::create(&outpath).map_err(|e| PrepError::fs(artifact, "extract", &outpath, e))?;
        std::io::copy(&mut zipped, &mut outfile)
            .map_err(|e| PrepError::fs(artifact, "extract", &outpath, e))?;

        // Set permissions on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = zipped.unix_mode() {
                std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode & 0o7777))
                    .map_err(|e| PrepError::fs(artifact, "extract", &outpath, e))?;
            }
        }

        files.push(entry.relative);
    }

    Ok(files)
}
