//! Optional settings file (`source-prep.toml`)
//!
//! Every key is optional and falls back to the built-in default:
//!
//! ```toml
//! public_base = "https://github.com"
//! internal_base = "https://git.example.net"   # default: https://$SOURCE_HOST
//! connect_timeout_secs = 5
//! ```

use super::env::AuthConfig;
use super::error::PrepError;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = "source-prep.toml";
pub const DEFAULT_PUBLIC_BASE: &str = "https://github.com";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct SettingsToml {
    public_base: Option<String>,
    internal_base: Option<String>,
    connect_timeout_secs: Option<u64>,
}

/// Resolved settings for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub public_base: String,
    /// Overrides the `https://<source_host>` default.
    pub internal_base: Option<String>,
    /// Internal requests only: bounds the connect and each socket read or write.
    pub connect_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            public_base: DEFAULT_PUBLIC_BASE.to_string(),
            internal_base: None,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

/// Base URLs resolved against the current credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub public_base: String,
    pub internal_base: String,
}

impl Settings {
    pub fn from_toml_str(content: &str) -> Result<Self, PrepError> {
        let parsed: SettingsToml = toml::from_str(content)
            .map_err(|e| PrepError::config(format!("invalid settings: {}", e)))?;

        let mut settings = Self::default();
        if let Some(base) = parsed.public_base {
            settings.public_base = base;
        }
        if parsed.internal_base.is_some() {
            settings.internal_base = parsed.internal_base;
        }
        if let Some(secs) = parsed.connect_timeout_secs {
            // Clamp to a sane range (1-60 seconds)
            settings.connect_timeout = Duration::from_secs(secs.clamp(1, 60));
        }
        Ok(settings)
    }

    /// Load settings from an explicit file. A missing file is an error.
    pub fn load(path: &Path) -> Result<Self, PrepError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PrepError::config(format!("cannot read settings {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
            .map_err(|e| PrepError::config(format!("{}: {}", path.display(), e)))
    }

    /// Load `source-prep.toml` from the working directory if it exists,
    /// otherwise use the defaults.
    pub fn load_from_workdir(workdir: &Path) -> Result<Self, PrepError> {
        let path = workdir.join(CONFIG_FILE_NAME);
        if path.is_file() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn endpoints(&self, auth: &AuthConfig) -> Endpoints {
        let internal_base = self
            .internal_base
            .clone()
            .unwrap_or_else(|| format!("https://{}", auth.source_host.trim()));
        Endpoints {
            public_base: trim_base(&self.public_base),
            internal_base: trim_base(&internal_base),
        }
    }
}

fn trim_base(base: &str) -> String {
    base.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.connect_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_overrides_merge_over_defaults() {
        let settings = Settings::from_toml_str(
            r#"
internal_base = "https://mirror.example.net/"
connect_timeout_secs = 10
"#,
        )
        .unwrap();
        assert_eq!(settings.public_base, DEFAULT_PUBLIC_BASE);
        assert_eq!(
            settings.internal_base.as_deref(),
            Some("https://mirror.example.net/")
        );
        assert_eq!(settings.connect_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_timeout_is_clamped() {
        let settings = Settings::from_toml_str("connect_timeout_secs = 0").unwrap();
        assert_eq!(settings.connect_timeout, Duration::from_secs(1));
        let settings = Settings::from_toml_str("connect_timeout_secs = 900").unwrap();
        assert_eq!(settings.connect_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = Settings::from_toml_str("public_bsae = \"x\"").unwrap_err();
        assert!(err.to_string().contains("invalid settings"));
    }

    #[test]
    fn test_endpoints_derive_internal_base_from_host() {
        let auth = AuthConfig {
            source_host: "git.example.net".into(),
            ..Default::default()
        };
        let endpoints = Settings::default().endpoints(&auth);
        assert_eq!(endpoints.public_base, "https://github.com");
        assert_eq!(endpoints.internal_base, "https://git.example.net");
    }

    #[test]
    fn test_endpoints_strip_trailing_slash() {
        let settings = Settings {
            public_base: "http://127.0.0.1:9000/".into(),
            internal_base: Some("http://127.0.0.1:9001/".into()),
            ..Default::default()
        };
        let endpoints = settings.endpoints(&AuthConfig::default());
        assert_eq!(endpoints.public_base, "http://127.0.0.1:9000");
        assert_eq!(endpoints.internal_base, "http://127.0.0.1:9001");
    }

    #[test]
    fn test_load_from_workdir_without_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from_workdir(dir.path()).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_from_workdir_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "public_base = \"http://localhost:8080\"\n",
        )
        .unwrap();
        let settings = Settings::load_from_workdir(dir.path()).unwrap();
        assert_eq!(settings.public_base, "http://localhost:8080");
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().contains("cannot read settings"));
    }
}
