//! Fetch job: fetch → verify → materialize → relocate → cleanup
//!
//! Nothing destructive happens until the archive has been verified. A
//! failed download or a digest mismatch leaves the previous destination
//! exactly as it was; only the archive file is discarded.

use crate::artifact::{ArtifactSpec, Scope};
use crate::core::config::Endpoints;
use crate::core::error::PrepError;
use crate::core::output;
use crate::helpers::fetch::Fetch;
use crate::helpers::{extract, fs_utils, hash};
use std::path::{Path, PathBuf};

/// Outcome of a successful job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    pub artifact: String,
    pub scope: Scope,
    pub bytes: u64,
    /// Files the job produced, absolute or relative to the working directory
    /// depending on how the working directory was given.
    pub outputs: Vec<PathBuf>,
}

/// Deletes the downloaded archive on every exit path.
struct ArchiveGuard {
    path: PathBuf,
}

impl ArchiveGuard {
    fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the archive now, reporting failure.
    fn finish(self, artifact: &str) -> Result<(), PrepError> {
        fs_utils::remove_path(&self.path).map_err(|e| PrepError::fs(artifact, "cleanup", &self.path, e))
    }
}

impl Drop for ArchiveGuard {
    fn drop(&mut self) {
        let _ = fs_utils::remove_path(&self.path);
    }
}

/// One artifact, bound to a working directory and resolved endpoints.
pub struct FetchJob<'a> {
    spec: &'a ArtifactSpec<'a>,
    workdir: &'a Path,
    endpoints: &'a Endpoints,
}

impl<'a> FetchJob<'a> {
    pub fn new(spec: &'a ArtifactSpec<'a>, workdir: &'a Path, endpoints: &'a Endpoints) -> Self {
        Self {
            spec,
            workdir,
            endpoints,
        }
    }

    pub fn url(&self) -> String {
        self.spec.url(self.endpoints)
    }

    pub fn archive_path(&self) -> PathBuf {
        self.workdir.join(self.spec.archive_filename())
    }

    pub fn destination(&self) -> PathBuf {
        self.workdir.join(self.spec.destination)
    }

    pub fn run(&self, fetcher: &dyn Fetch) -> Result<JobReport, PrepError> {
        let spec = self.spec;
        if fetcher.scope() != spec.scope {
            return Err(PrepError::config(format!(
                "'{}' is a {} artifact but was handed a {} fetcher",
                spec.name,
                spec.scope,
                fetcher.scope()
            )));
        }

        let url = self.url();
        let archive = ArchiveGuard {
            path: self.archive_path(),
        };

        output::detail(&format!("fetching {}", url));
        let bytes = fetcher.fetch(spec.name, &url, archive.path())?;

        output::detail(&format!("verifying sha256 of {}", spec.archive_filename()));
        hash::verify_sha256(spec.name, archive.path(), spec.sha256)?;

        let destination = self.destination();
        let mut outputs = extract::materialize(spec.name, archive.path(), &destination, true)?;
        if !spec.relocations.is_empty() {
            outputs = extract::relocate(spec.name, &destination, spec.relocations, self.workdir)?;
        }

        archive.finish(spec.name)?;

        Ok(JobReport {
            artifact: spec.name.to_string(),
            scope: spec.scope,
            bytes,
            outputs,
        })
    }
}
