//! Environment resolution
//!
//! Reads the fixed set of variables that control internal mode into an
//! [`EnvConfig`]. Resolution never fails: unset variables become empty
//! strings. Validation happens in the pipeline, right before the first
//! internal request would be made.

use super::error::PrepError;

/// Enables internal mode when set to [`INTERNAL_MODE_ON`].
pub const INTERNAL_MODE_VAR: &str = "NFLX_INTERNAL";
pub const INTERNAL_MODE_ON: &str = "ON";
pub const SOURCE_HOST_VAR: &str = "SOURCE_HOST";
pub const CLIENT_CERT_VAR: &str = "CLIENT_CERT_PATH";
pub const CLIENT_KEY_VAR: &str = "CLIENT_KEY_PATH";

/// Credentials for the internal source host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthConfig {
    pub source_host: String,
    pub client_cert_path: String,
    pub client_key_path: String,
}

impl AuthConfig {
    /// Names of the environment variables that are empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            (SOURCE_HOST_VAR, &self.source_host),
            (CLIENT_CERT_VAR, &self.client_cert_path),
            (CLIENT_KEY_VAR, &self.client_key_path),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    pub fn validate(&self) -> Result<(), PrepError> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            return Ok(());
        }
        Err(PrepError::config(format!(
            "{}={} requires {} to be set",
            INTERNAL_MODE_VAR,
            INTERNAL_MODE_ON,
            missing.join(", ")
        )))
    }
}

/// Snapshot of the process environment taken once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvConfig {
    pub internal_mode: bool,
    pub auth: AuthConfig,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup (tests pass a map here).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).unwrap_or_default();
        Self {
            internal_mode: lookup(INTERNAL_MODE_VAR).as_deref() == Some(INTERNAL_MODE_ON),
            auth: AuthConfig {
                source_host: var(SOURCE_HOST_VAR),
                client_cert_path: var(CLIENT_CERT_VAR),
                client_key_path: var(CLIENT_KEY_VAR),
            },
        }
    }

    /// Credentials, only when internal mode was requested.
    pub fn internal_auth(&self) -> Option<&AuthConfig> {
        self.internal_mode.then_some(&self.auth)
    }
}
