//! Configuration management
//!
//! This module handles loading the s3kv configuration file.
//! The configuration file is stored in TOML format at ~/.config/s3kv/config.toml.
//! Values from the environment or command line are layered on top by the
//! binary before a proxy is constructed; nothing is reloaded afterwards.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Current configuration schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Default backend region
const DEFAULT_REGION: &str = "us-east-1";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Schema version for migration support
    pub schema_version: u32,

    /// Object-storage settings
    #[serde(default)]
    pub storage: Settings,
}

/// Settings needed to reach the storage backend
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Bucket holding every stored item
    #[serde(default)]
    pub bucket: String,

    /// Access key ID
    #[serde(default)]
    pub access_key_id: String,

    /// Backend region name
    #[serde(default = "default_region")]
    pub region: String,

    /// Secret access key, used when the secret file yields nothing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_access_key: Option<String>,

    /// Mounted secret file overriding `secret_access_key`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_file: Option<PathBuf>,

    /// Custom endpoint for S3-compatible services
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Use path-style bucket addressing
    #[serde(default)]
    pub force_path_style: bool,
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            access_key_id: String::new(),
            region: default_region(),
            secret_access_key: None,
            secret_file: None,
            endpoint: None,
            force_path_style: false,
        }
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("bucket", &self.bucket)
            .field("access_key_id", &self.access_key_id)
            .field("region", &self.region)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "<redacted>"),
            )
            .field("secret_file", &self.secret_file)
            .field("endpoint", &self.endpoint)
            .field("force_path_style", &self.force_path_style)
            .finish()
    }
}

impl Settings {
    /// Create settings with the required fields
    pub fn new(bucket: impl Into<String>, access_key_id: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            access_key_id: access_key_id.into(),
            ..Default::default()
        }
    }

    /// Check that the settings can back a proxy
    ///
    /// Region names are checked by the client factory, not here.
    pub fn validate(&self) -> Result<()> {
        if self.bucket.is_empty() {
            return Err(Error::Config("bucket name is not configured".into()));
        }

        if let Some(endpoint) = &self.endpoint {
            url::Url::parse(endpoint)?;
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            storage: Settings::default(),
        }
    }
}

/// Configuration manager handles loading and saving config
#[derive(Debug)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the default config path
    pub fn new() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not determine config directory".into()))?;
        let config_path = config_dir.join("s3kv").join("config.toml");
        Ok(Self { config_path })
    }

    /// Create a ConfigManager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Load configuration from disk
    ///
    /// If the configuration file doesn't exist, returns a default configuration.
    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&self.config_path)?;
        let config: Config = toml::from_str(&content)?;

        if config.schema_version > SCHEMA_VERSION {
            return Err(Error::Config(format!(
                "Configuration file version {} is newer than supported version {}. Please upgrade s3kv.",
                config.schema_version, SCHEMA_VERSION
            )));
        }

        Ok(config)
    }
}
