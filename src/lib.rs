//! Source-tree preparation for the native build
//!
//! Fetches the external archives the build needs but the repository does not
//! vendor, verifies each against a pinned SHA-256, and materializes only the
//! files the build uses.
//!
//! # Pipeline
//!
//! 1. Public artifacts (always): anonymous HTTPS from the public archive host.
//! 2. Internal artifacts (only with `NFLX_INTERNAL=ON`): mutual-TLS HTTPS
//!    against `SOURCE_HOST`, using `CLIENT_CERT_PATH` / `CLIENT_KEY_PATH`.
//!    Missing credentials fail the run before any internal request is made.
//!
//! Each artifact goes through fetch → verify → extract → relocate → cleanup.
//! Nothing on disk is touched until the digest matches, so a failing run
//! never damages a tree produced by an earlier good run.
//!
//! # Example
//!
//! ```no_run
//! use source_prep::{EnvConfig, HttpConnector, Pipeline, Settings};
//! use std::path::Path;
//!
//! let settings = Settings::load_from_workdir(Path::new("."))?;
//! let connector = HttpConnector::new(&settings);
//! let report = Pipeline::new(".", EnvConfig::from_env(), settings).run(&connector)?;
//! println!("{} artifacts prepared", report.jobs.len());
//! # Ok::<(), source_prep::PrepError>(())
//! ```

pub mod artifact;
pub mod core;
pub mod helpers;
pub mod job;
pub mod pipeline;
pub mod requirements;

pub use crate::artifact::{ArtifactSpec, Relocation, Scope};
pub use crate::core::config::{Endpoints, Settings};
pub use crate::core::env::{AuthConfig, EnvConfig};
pub use crate::core::error::{ErrorKind, PrepError};
pub use crate::core::output;
pub use crate::helpers::fetch::{Connector, Fetch, HttpConnector};
pub use crate::job::{FetchJob, JobReport};
pub use crate::pipeline::{Pipeline, PipelineReport, Stage};
