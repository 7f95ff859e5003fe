//! Error taxonomy for the preparation pipeline.
//!
//! Every failure carries the artifact name (where one applies) and the stage
//! it happened in, so a single failed run is enough to diagnose it.

use crate::artifact::Scope;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Coarse classification of a [`PrepError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Network,
    Integrity,
    Filesystem,
}

/// Errors that can occur while preparing the source tree.
#[derive(Error, Debug)]
pub enum PrepError {
    #[error("configuration error: {message}")]
    Configuration { message: String },

    #[error("{scope} fetch of '{artifact}' failed: {url}: {message}")]
    Network {
        artifact: String,
        scope: Scope,
        url: String,
        message: String,
    },

    #[error("sha256 verification failed for '{artifact}': expected {expected}, got {actual}")]
    Integrity {
        artifact: String,
        expected: String,
        actual: String,
    },

    #[error("{stage} failed for '{artifact}' at {}: {source}", .path.display())]
    Filesystem {
        artifact: String,
        stage: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed archive for '{artifact}': {message}")]
    Archive { artifact: String, message: String },
}

impl PrepError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn fs(artifact: &str, stage: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::Filesystem {
            artifact: artifact.to_string(),
            stage,
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn archive(artifact: &str, message: impl Into<String>) -> Self {
        Self::Archive {
            artifact: artifact.to_string(),
            message: message.into(),
        }
    }

    /// Classify the error. Malformed archives count as filesystem failures
    /// since they surface during extraction.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::Network { .. } => ErrorKind::Network,
            Self::Integrity { .. } => ErrorKind::Integrity,
            Self::Filesystem { .. } | Self::Archive { .. } => ErrorKind::Filesystem,
        }
    }

    /// Name of the artifact the error belongs to, if any.
    pub fn artifact(&self) -> Option<&str> {
        match self {
            Self::Configuration { .. } => None,
            Self::Network { artifact, .. }
            | Self::Integrity { artifact, .. }
            | Self::Filesystem { artifact, .. }
            | Self::Archive { artifact, .. } => Some(artifact),
        }
    }
}
