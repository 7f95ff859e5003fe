//! Artifact descriptors and the catalog of known external sources
//!
//! Each [`ArtifactSpec`] pins a repository to an immutable revision and the
//! SHA-256 of the archive the host serves for it. Bumping a revision means
//! updating both; `source-prep hash <file>` prints the digest of a freshly
//! downloaded archive.

use crate::core::config::Endpoints;
use std::fmt;

/// Which host, and which authentication mode, serves an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Anonymous HTTPS against the public archive host.
    Public,
    /// Mutual-TLS HTTPS against `SOURCE_HOST`.
    Internal,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => f.write_str("public"),
            Self::Internal => f.write_str("internal"),
        }
    }
}

/// Moves one extracted file out of the scratch directory.
///
/// `source` is relative to the extracted tree, `destination` to the working
/// directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relocation<'a> {
    pub source: &'a str,
    pub destination: &'a str,
}

/// Immutable descriptor of one fetchable archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactSpec<'a> {
    pub name: &'a str,
    /// `owner/repo` on the serving host.
    pub repository: &'a str,
    /// Commit hash; never a branch or tag.
    pub revision: &'a str,
    /// Hex SHA-256 of the archive bytes.
    pub sha256: &'a str,
    pub scope: Scope,
    /// Relative to the working directory. When `relocations` is non-empty
    /// this is only a scratch area and does not survive the job.
    pub destination: &'a str,
    pub relocations: &'a [Relocation<'a>],
}

impl ArtifactSpec<'_> {
    pub fn archive_filename(&self) -> String {
        format!("{}-{}.zip", self.name, self.revision)
    }

    pub fn url(&self, endpoints: &Endpoints) -> String {
        match self.scope {
            Scope::Public => format!(
                "{}/{}/archive/{}.zip",
                endpoints.public_base, self.repository, self.revision
            ),
            Scope::Internal => format!(
                "{}/api/v3/repos/{}/zipball/{}",
                endpoints.internal_base, self.repository, self.revision
            ),
        }
    }

    /// Short revision for display.
    pub fn short_revision(&self) -> &str {
        self.revision.get(..12).unwrap_or(self.revision)
    }
}

/// Header-only hash map used by the metric registry.
pub const FLAT_HASH_MAP: ArtifactSpec<'static> = ArtifactSpec {
    name: "flat_hash_map",
    repository: "skarupke/flat_hash_map",
    revision: "2c4687431f978f02a3780e24b8b701d22aa32d9c",
    sha256: "513efb9c2f246b6df9fa16c5640618f09804b009e69c8f7bd18b3099a11203d5",
    scope: Scope::Public,
    destination: "ska",
    relocations: &[],
};

/// Internal common-tags and publish endpoint configuration.
pub const SPECTATOR_CPPCONF: ArtifactSpec<'static> = ArtifactSpec {
    name: "netflix_spectator_cppconf",
    repository: "corp/netflix-spectator-cppconf",
    revision: "88e98808b2a5cbd60198faa79dd1eaee557ce71b",
    sha256: "af4d6d9458bf367a1c6ec04e4dae6b15060446331f6f8edd66cf518f0f453dc1",
    scope: Scope::Internal,
    destination: "netflix_spectator_cppconf",
    relocations: &[Relocation {
        source: "netflix_config.cc",
        destination: "spectator/netflix_config.cc",
    }],
};

/// Fetched in every build mode.
pub const PUBLIC_ARTIFACTS: &[ArtifactSpec<'static>] = &[FLAT_HASH_MAP];

/// Fetched, in this order, only in internal mode.
pub const INTERNAL_ARTIFACTS: &[ArtifactSpec<'static>] = &[SPECTATOR_CPPCONF];
