//! Secure fetcher
//!
//! The only code that touches the network. [`Connector`] builds one
//! [`Fetch`] per scope; the pipeline asks for the internal one only after the
//! credentials have been validated, so a missing credential never costs a
//! request.
//!
//! Public requests have no explicit timeout. Internal requests bound the
//! connect, every socket read (TLS handshake and response included) and every
//! write by the same timeout, so an internal host that accepts a connection
//! and then goes silent cannot hang the build.

use super::fs_utils;
use super::progress::{self, ProgressGuard, upgrade_to_bytes};
use super::tls::ClientIdentity;
use crate::artifact::Scope;
use crate::core::config::Settings;
use crate::core::env::AuthConfig;
use crate::core::error::PrepError;
use rustls::ClientConfig;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// `Accept` header for the internal zipball API
pub const INTERNAL_ACCEPT: &str = "application/vnd.github.v3.raw";

/// API version pinned on every internal request
pub const INTERNAL_API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
pub const INTERNAL_API_VERSION: &str = "2022-11-28";

const USER_AGENT: &str = concat!("source-prep/", env!("CARGO_PKG_VERSION"));

/// Retrieves one URL into a local file.
pub trait Fetch {
    fn scope(&self) -> Scope;

    /// Download `url` to `dest`, creating or truncating it. Returns the
    /// number of bytes written. On error `dest` may hold a partial body.
    fn fetch(&self, artifact: &str, url: &str, dest: &Path) -> Result<u64, PrepError>;
}

/// Builds fetchers for each scope.
pub trait Connector {
    fn public(&self) -> Result<Box<dyn Fetch>, PrepError>;

    /// Load the client identity and build an authenticated fetcher.
    /// Credential problems surface here, before any request.
    fn internal(&self, auth: &AuthConfig) -> Result<Box<dyn Fetch>, PrepError>;
}

/// `ureq`-backed fetcher.
pub struct HttpFetcher {
    agent: ureq::Agent,
    scope: Scope,
    headers: &'static [(&'static str, &'static str)],
}

impl HttpFetcher {
    /// Anonymous HTTPS.
    pub fn public() -> Self {
        Self {
            agent: ureq::AgentBuilder::new().user_agent(USER_AGENT).build(),
            scope: Scope::Public,
            headers: &[],
        }
    }

    /// HTTPS presenting `identity`. `timeout` bounds the connect and each
    /// read or write; a slow but steady download is not cut off.
    pub fn internal(identity: &ClientIdentity, timeout: Duration) -> Self {
        Self::over_tls(identity.client_config(), timeout)
    }

    fn over_tls(tls: Arc<ClientConfig>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .user_agent(USER_AGENT)
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .timeout_write(timeout)
            .tls_config(tls)
            .build();
        Self {
            agent,
            scope: Scope::Internal,
            headers: &[
                ("Accept", INTERNAL_ACCEPT),
                (INTERNAL_API_VERSION_HEADER, INTERNAL_API_VERSION),
            ],
        }
    }

    fn network_error(&self, artifact: &str, url: &str, message: String) -> PrepError {
        PrepError::Network {
            artifact: artifact.to_string(),
            scope: self.scope,
            url: url.to_string(),
            message,
        }
    }
}

impl Fetch for HttpFetcher {
    fn scope(&self) -> Scope {
        self.scope
    }

    fn fetch(&self, artifact: &str, url: &str, dest: &Path) -> Result<u64, PrepError> {
        let filename = dest
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "download".to_string());

        let mut request = self.agent.get(url);
        for (name, value) in self.headers {
            request = request.set(name, value);
        }

        let response = request.call().map_err(|e| {
            let message = match e {
                ureq::Error::Status(code, response) => {
                    format!("HTTP status {} {}", code, response.status_text())
                }
                ureq::Error::Transport(transport) => transport.to_string(),
            };
            self.network_error(artifact, url, message)
        })?;

        // ureq reports 4xx/5xx as errors and follows redirects; anything else
        // outside 2xx is still not an archive.
        if !(200..300).contains(&response.status()) {
            return Err(self.network_error(
                artifact,
                url,
                format!("HTTP status {} {}", response.status(), response.status_text()),
            ));
        }

        let pb = progress::create_spinner(&format!("downloading {}", filename));
        let _guard = ProgressGuard::new(&pb);
        if let Some(len) = response
            .header("content-length")
            .and_then(|s| s.parse().ok())
        {
            upgrade_to_bytes(&pb, len);
        }

        fs_utils::ensure_parent_dir(dest).map_err(|e| PrepError::fs(artifact, "download", dest, e))?;
        let mut file =
            std::fs::File::create(dest).map_err(|e| PrepError::fs(artifact, "download", dest, e))?;

        let mut reader = response.into_reader();
        let mut buffer = [0u8; 8192];
        let mut total_bytes = 0u64;

        loop {
            let bytes_read = reader
                .read(&mut buffer)
                .map_err(|e| self.network_error(artifact, url, format!("read error: {}", e)))?;
            if bytes_read == 0 {
                break;
            }
            file.write_all(&buffer[..bytes_read])
                .map_err(|e| PrepError::fs(artifact, "download", dest, e))?;
            total_bytes += bytes_read as u64;
            pb.set_position(total_bytes);
        }

        file.flush()
            .map_err(|e| PrepError::fs(artifact, "download", dest, e))?;
        Ok(total_bytes)
    }
}

/// Production connector built from [`Settings`].
#[derive(Debug, Clone)]
pub struct HttpConnector {
    connect_timeout: Duration,
}

impl HttpConnector {
    pub fn new(settings: &Settings) -> Self {
        Self {
            connect_timeout: settings.connect_timeout,
        }
    }
}

impl Connector for HttpConnector {
    fn public(&self) -> Result<Box<dyn Fetch>, PrepError> {
        Ok(Box::new(HttpFetcher::public()))
    }

    fn internal(&self, auth: &AuthConfig) -> Result<Box<dyn Fetch>, PrepError> {
        let identity = ClientIdentity::load(auth)?;
        Ok(Box::new(HttpFetcher::internal(&identity, self.connect_timeout)))
    }
}
