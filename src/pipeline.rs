//! Pipeline orchestrator
//!
//! ```text
//! Init → FetchingPublic → ResolvingEnv ─┬─────────────────────────────→ Done
//!                                       └→ ValidatingAuth → FetchingInternal(0..n) → Done
//! ```
//!
//! Any error moves the pipeline to `Failed` and is returned unchanged. Public
//! artifacts are always fetched first since every build mode needs them.
//! Internal artifacts are all-or-nothing: the first failure stops the rest.

use crate::artifact::{ArtifactSpec, INTERNAL_ARTIFACTS, PUBLIC_ARTIFACTS};
use crate::core::config::Settings;
use crate::core::env::EnvConfig;
use crate::core::error::PrepError;
use crate::core::output;
use crate::helpers::fetch::{Connector, Fetch};
use crate::helpers::fs_utils;
use crate::job::{FetchJob, JobReport};
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    FetchingPublic,
    ResolvingEnv,
    ValidatingAuth,
    /// Index into the internal artifact list.
    FetchingInternal(usize),
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => f.write_str("init"),
            Self::FetchingPublic => f.write_str("fetching public artifacts"),
            Self::ResolvingEnv => f.write_str("resolving environment"),
            Self::ValidatingAuth => f.write_str("validating credentials"),
            Self::FetchingInternal(i) => write!(f, "fetching internal artifact #{}", i + 1),
            Self::Done => f.write_str("done"),
            Self::Failed => f.write_str("failed"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub internal_mode: bool,
    pub jobs: Vec<JobReport>,
}

pub struct Pipeline<'a> {
    workdir: PathBuf,
    env: EnvConfig,
    settings: Settings,
    public: &'a [ArtifactSpec<'a>],
    internal: &'a [ArtifactSpec<'a>],
    stage: Stage,
}

impl Pipeline<'static> {
    /// A pipeline over the built-in artifact catalog.
    pub fn new(workdir: impl Into<PathBuf>, env: EnvConfig, settings: Settings) -> Self {
        Pipeline::with_artifacts(workdir, env, settings, PUBLIC_ARTIFACTS, INTERNAL_ARTIFACTS)
    }
}

impl<'a> Pipeline<'a> {
    pub fn with_artifacts(
        workdir: impl Into<PathBuf>,
        env: EnvConfig,
        settings: Settings,
        public: &'a [ArtifactSpec<'a>],
        internal: &'a [ArtifactSpec<'a>],
    ) -> Self {
        Self {
            workdir: workdir.into(),
            env,
            settings,
            public,
            internal,
            stage: Stage::Init,
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn run(&mut self, connector: &dyn Connector) -> Result<PipelineReport, PrepError> {
        self.stage = Stage::Init;
        match self.run_stages(connector) {
            Ok(report) => {
                self.stage = Stage::Done;
                Ok(report)
            }
            Err(e) => {
                output::error(&format!("source preparation failed while {}", self.stage));
                self.stage = Stage::Failed;
                Err(e)
            }
        }
    }

    fn run_stages(&mut self, connector: &dyn Connector) -> Result<PipelineReport, PrepError> {
        let removed = fs_utils::sweep_stale_staging(&self.workdir)
            .map_err(|e| PrepError::fs("workdir", "sweep", &self.workdir, e))?;
        if removed > 0 {
            output::warning(&format!(
                "removed {} staging director{} left by an interrupted run",
                removed,
                if removed == 1 { "y" } else { "ies" }
            ));
        }

        let (public_specs, internal_specs) = (self.public, self.internal);
        let endpoints = self.settings.endpoints(&self.env.auth);
        let total = public_specs.len() + internal_specs.len();
        let mut report = PipelineReport {
            internal_mode: self.env.internal_mode,
            jobs: Vec::with_capacity(total),
        };

        self.stage = Stage::FetchingPublic;
        let public = connector.public()?;
        for spec in public_specs {
            self.announce(spec, report.jobs.len() + 1);
            report
                .jobs
                .push(FetchJob::new(spec, &self.workdir, &endpoints).run(public.as_ref())?);
        }

        self.stage = Stage::ResolvingEnv;
        let Some(auth) = self.env.internal_auth() else {
            output::skip("internal mode disabled, skipping internal bundles");
            return Ok(report);
        };

        self.stage = Stage::ValidatingAuth;
        auth.validate()?;
        let internal: Box<dyn Fetch> = connector.internal(auth)?;

        for (i, spec) in internal_specs.iter().enumerate() {
            self.stage = Stage::FetchingInternal(i);
            self.announce(spec, report.jobs.len() + 1);
            report
                .jobs
                .push(FetchJob::new(spec, &self.workdir, &endpoints).run(internal.as_ref())?);
        }

        Ok(report)
    }

    fn announce(&self, spec: &ArtifactSpec<'_>, current: usize) {
        let total = if self.env.internal_mode {
            self.public.len() + self.internal.len()
        } else {
            self.public.len()
        };
        output::sub_action_numbered(
            current,
            total,
            &format!("{} @ {}", spec.name, spec.short_revision()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::FetchingInternal(0).to_string(), "fetching internal artifact #1");
        assert_eq!(Stage::ValidatingAuth.to_string(), "validating credentials");
    }

    #[test]
    fn test_new_uses_catalog_and_starts_in_init() {
        let pipeline = Pipeline::new("/tmp/src", EnvConfig::default(), Settings::default());
        assert_eq!(pipeline.stage(), Stage::Init);
        assert_eq!(pipeline.public.len(), PUBLIC_ARTIFACTS.len());
        assert_eq!(pipeline.internal.len(), INTERNAL_ARTIFACTS.len());
        assert_eq!(pipeline.workdir(), Path::new("/tmp/src"));
    }
}
