//! Client identity for mutual TLS
//!
//! Loads the PEM certificate chain and private key named by
//! `CLIENT_CERT_PATH` / `CLIENT_KEY_PATH` and builds a rustls client config
//! that presents them. Server certificates are checked against the webpki
//! root store.

use crate::core::env::AuthConfig;
use crate::core::error::PrepError;
use rustls::pki_types::pem::PemObject;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::{ClientConfig, RootCertStore};
use std::path::Path;
use std::sync::Arc;

/// A parsed client certificate and key, ready to hand to an HTTP agent.
#[derive(Debug, Clone)]
pub struct ClientIdentity {
    config: Arc<ClientConfig>,
}

impl ClientIdentity {
    /// Read and parse the credential files. Any failure is a configuration
    /// error: it is detected before a request is attempted.
    pub fn load(auth: &AuthConfig) -> Result<Self, PrepError> {
        let cert_pem = read_pem(Path::new(&auth.client_cert_path), "client certificate")?;
        let key_pem = read_pem(Path::new(&auth.client_key_path), "client key")?;
        Self::from_pem(&cert_pem, &key_pem)
    }

    /// Parse an identity that trusts the webpki root store.
    pub fn from_pem(cert_pem: &[u8], key_pem: &[u8]) -> Result<Self, PrepError> {
        let roots = RootCertStore {
            roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
        };
        Self::from_pem_with_roots(cert_pem, key_pem, roots)
    }

    /// Parse an identity that trusts only `roots` when verifying the server.
    pub fn from_pem_with_roots(
        cert_pem: &[u8],
        key_pem: &[u8],
        roots: RootCertStore,
    ) -> Result<Self, PrepError> {
        let certs = parse_certificates(cert_pem)?;
        if certs.is_empty() {
            return Err(PrepError::config("no certificates found in client certificate file"));
        }
        let key = parse_private_key(key_pem)?;

        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let config = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|e| PrepError::config(format!("TLS protocol setup failed: {e}")))?
            .with_root_certificates(roots)
            .with_client_auth_cert(certs, key)
            .map_err(|e| PrepError::config(format!("client certificate rejected: {e}")))?;

        Ok(Self {
            config: Arc::new(config),
        })
    }

    pub fn client_config(&self) -> Arc<ClientConfig> {
        Arc::clone(&self.config)
    }
}

fn read_pem(path: &Path, what: &str) -> Result<Vec<u8>, PrepError> {
    std::fs::read(path)
        .map_err(|e| PrepError::config(format!("cannot read {} {}: {}", what, path.display(), e)))
}

fn parse_certificates(pem: &[u8]) -> Result<Vec<CertificateDer<'static>>, PrepError> {
    CertificateDer::pem_slice_iter(pem)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| PrepError::config(format!("failed to parse client certificate: {e}")))
}

fn parse_private_key(pem: &[u8]) -> Result<PrivateKeyDer<'static>, PrepError> {
    PrivateKeyDer::from_pem_slice(pem)
        .map_err(|e| PrepError::config(format!("failed to parse client key: {e}")))
}
