//! In-memory connector that serves archive bodies by URL and records every
//! call, so tests can assert what the pipeline did and did not request.

#![allow(dead_code)]

use super::fixtures::{cppconf_zip, extra_zip, library_zip, sha256_hex};
use source_prep::{
    ArtifactSpec, AuthConfig, Connector, EnvConfig, Fetch, PrepError, Relocation, Scope, Settings,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

pub const LIBRARY_REVISION: &str = "2c4687431f978f02a3780e24b8b701d22aa32d9c";
pub const CPPCONF_REVISION: &str = "88e98808b2a5cbd60198faa79dd1eaee557ce71b";
pub const EXTRA_REVISION: &str = "4f3d1c2a9b7e6d5c8a1f0e2d3c4b5a69788f7e6d";

pub const CPPCONF_RELOCATIONS: &[Relocation<'static>] = &[Relocation {
    source: "netflix_config.cc",
    destination: "spectator/netflix_config.cc",
}];

pub const EXTRA_RELOCATIONS: &[Relocation<'static>] = &[Relocation {
    source: "extra_config.cc",
    destination: "extra/extra_config.cc",
}];

/// Everything the recording connector saw.
#[derive(Debug, Default, Clone)]
pub struct CallLog {
    pub public_fetches: Vec<String>,
    pub internal_connects: Vec<String>,
    pub internal_fetches: Vec<String>,
}

#[derive(Clone, Default)]
pub struct RecordingConnector {
    bodies: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    log: Arc<Mutex<CallLog>>,
}

impl RecordingConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `url`, replacing whatever was served before.
    pub fn serve(&self, url: impl Into<String>, body: Vec<u8>) {
        self.bodies.lock().unwrap().insert(url.into(), body);
    }

    pub fn log(&self) -> CallLog {
        self.log.lock().unwrap().clone()
    }

    fn fetcher(&self, scope: Scope) -> Box<dyn Fetch> {
        Box::new(RecordingFetch {
            scope,
            bodies: Arc::clone(&self.bodies),
            log: Arc::clone(&self.log),
        })
    }
}

impl Connector for RecordingConnector {
    fn public(&self) -> Result<Box<dyn Fetch>, PrepError> {
        Ok(self.fetcher(Scope::Public))
    }

    fn internal(&self, auth: &AuthConfig) -> Result<Box<dyn Fetch>, PrepError> {
        self.log
            .lock()
            .unwrap()
            .internal_connects
            .push(auth.source_host.clone());
        Ok(self.fetcher(Scope::Internal))
    }
}

struct RecordingFetch {
    scope: Scope,
    bodies: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    log: Arc<Mutex<CallLog>>,
}

impl Fetch for RecordingFetch {
    fn scope(&self) -> Scope {
        self.scope
    }

    fn fetch(&self, artifact: &str, url: &str, dest: &Path) -> Result<u64, PrepError> {
        {
            let mut log = self.log.lock().unwrap();
            match self.scope {
                Scope::Public => log.public_fetches.push(url.to_string()),
                Scope::Internal => log.internal_fetches.push(url.to_string()),
            }
        }

        let body = self.bodies.lock().unwrap().get(url).cloned();
        let Some(body) = body else {
            return Err(PrepError::Network {
                artifact: artifact.to_string(),
                scope: self.scope,
                url: url.to_string(),
                message: "HTTP status 404 Not Found".to_string(),
            });
        };
        std::fs::write(dest, &body).map_err(|e| PrepError::fs(artifact, "download", dest, e))?;
        Ok(body.len() as u64)
    }
}

/// Environment built from literal pairs instead of the process environment.
pub fn env_from(vars: &[(&str, &str)]) -> EnvConfig {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    EnvConfig::from_lookup(|k| map.get(k).cloned())
}

/// Internal mode with a complete set of credentials.
pub fn internal_env() -> EnvConfig {
    env_from(&[
        ("NFLX_INTERNAL", "ON"),
        ("SOURCE_HOST", "git.example.net"),
        ("CLIENT_CERT_PATH", "/certs/client.pem"),
        ("CLIENT_KEY_PATH", "/certs/client.key"),
    ])
}

/// Three archives and artifact descriptors pinned to their digests.
pub struct Catalog {
    pub library: Vec<u8>,
    pub cppconf: Vec<u8>,
    pub extra: Vec<u8>,
    library_digest: String,
    cppconf_digest: String,
    extra_digest: String,
}

impl Catalog {
    pub fn new() -> Self {
        let (library, cppconf, extra) = (library_zip(), cppconf_zip(), extra_zip());
        Self {
            library_digest: sha256_hex(&library),
            cppconf_digest: sha256_hex(&cppconf),
            extra_digest: sha256_hex(&extra),
            library,
            cppconf,
            extra,
        }
    }

    pub fn public(&self) -> [ArtifactSpec<'_>; 1] {
        [ArtifactSpec {
            name: "flat_hash_map",
            repository: "skarupke/flat_hash_map",
            revision: LIBRARY_REVISION,
            sha256: &self.library_digest,
            scope: Scope::Public,
            destination: "ska",
            relocations: &[],
        }]
    }

    pub fn internal(&self) -> [ArtifactSpec<'_>; 2] {
        [
            ArtifactSpec {
                name: "netflix_spectator_cppconf",
                repository: "corp/netflix-spectator-cppconf",
                revision: CPPCONF_REVISION,
                sha256: &self.cppconf_digest,
                scope: Scope::Internal,
                destination: "netflix_spectator_cppconf",
                relocations: CPPCONF_RELOCATIONS,
            },
            ArtifactSpec {
                name: "extra_bundle",
                repository: "corp/extra-bundle",
                revision: EXTRA_REVISION,
                sha256: &self.extra_digest,
                scope: Scope::Internal,
                destination: "extra_bundle",
                relocations: EXTRA_RELOCATIONS,
            },
        ]
    }

    /// A connector serving every archive at the URL `settings` and `env`
    /// resolve it to.
    pub fn connector(&self, settings: &Settings, env: &EnvConfig) -> RecordingConnector {
        let endpoints = settings.endpoints(&env.auth);
        let connector = RecordingConnector::new();
        let [library] = self.public();
        let [cppconf, extra] = self.internal();
        connector.serve(library.url(&endpoints), self.library.clone());
        connector.serve(cppconf.url(&endpoints), self.cppconf.clone());
        connector.serve(extra.url(&endpoints), self.extra.clone());
        connector
    }
}
