//! Credential resolution
//!
//! The access key and region always come from configuration. The secret is
//! taken from the first source in an ordered chain that yields a non-empty
//! value: a mounted secret file first, then the configured value.

use std::fmt;
use std::path::PathBuf;

use crate::config::Settings;

/// Well-known path of the mounted secret access key
pub const DEFAULT_SECRET_FILE: &str = "/run/secrets/aws-s3-secret-access-key";

/// Credentials for one proxy operation
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Access key ID
    pub access_key_id: String,

    /// Secret access key
    pub secret_access_key: String,

    /// Backend region name
    pub region: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("region", &self.region)
            .finish()
    }
}

/// A place the secret access key may come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretSource {
    /// A mounted secret file
    File(PathBuf),

    /// A value supplied by configuration
    Value(Option<String>),
}

impl SecretSource {
    /// Read the secret, returning `None` when absent or empty
    ///
    /// Read failures are swallowed and only fall through to the next source.
    pub fn read(&self) -> Option<String> {
        let secret = match self {
            SecretSource::File(path) => match std::fs::read(path) {
                Ok(bytes) => String::from_utf8_lossy(&bytes)
                    .trim_end_matches(['\r', '\n'])
                    .to_string(),
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "Secret file not readable");
                    return None;
                }
            },
            SecretSource::Value(value) => value.clone()?,
        };

        (!secret.is_empty()).then_some(secret)
    }
}

/// Resolves fresh credentials for every operation
#[derive(Debug, Clone)]
pub struct CredentialResolver {
    access_key_id: String,
    region: String,
    sources: Vec<SecretSource>,
}

impl CredentialResolver {
    /// Create a resolver with an explicit secret chain
    pub fn new(
        access_key_id: impl Into<String>,
        region: impl Into<String>,
        sources: Vec<SecretSource>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            region: region.into(),
            sources,
        }
    }

    /// Build the file-then-configuration chain from settings
    pub fn from_settings(settings: &Settings) -> Self {
        let secret_file = settings
            .secret_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SECRET_FILE));

        Self::new(
            settings.access_key_id.clone(),
            settings.region.clone(),
            vec![
                SecretSource::File(secret_file),
                SecretSource::Value(settings.secret_access_key.clone()),
            ],
        )
    }

    /// Resolve credentials
    ///
    /// When no source yields a secret the credentials carry an empty secret
    /// and the backend rejects the request at call time.
    pub fn resolve(&self) -> Credentials {
        let secret_access_key = self
            .sources
            .iter()
            .find_map(SecretSource::read)
            .unwrap_or_default();

        if secret_access_key.is_empty() {
            tracing::warn!("No secret access key resolved; requests will fail authentication");
        }

        Credentials {
            access_key_id: self.access_key_id.clone(),
            secret_access_key,
            region: self.region.clone(),
        }
    }
}
