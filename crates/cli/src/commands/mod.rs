//! CLI command definitions and execution
//!
//! Every storage command builds one proxy from the layered settings
//! (config file, then environment, then flags) and maps the proxy's
//! outcome onto an exit code.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use kv_core::{ConfigManager, Settings, StorageProxy};
use kv_s3::S3ClientFactory;

use crate::exit_code::ExitCode;
use crate::output::OutputConfig;

mod clear;
mod get;
mod ls;
mod rm;
mod serve;
mod set;

/// s3kv - key-value store on S3-compatible object storage
///
/// Stores string values under string keys in a single bucket.
/// Every failure to reach the backend is reported as "no value".
#[derive(Parser, Debug)]
#[command(name = "s3kv")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format: human-readable or JSON
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value = "false")]
    pub no_color: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true, default_value = "false")]
    pub debug: bool,

    #[command(flatten)]
    pub storage: StorageArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Storage settings that override the config file
#[derive(Args, Debug, Clone, Default)]
pub struct StorageArgs {
    /// Path to the config file
    #[arg(long, global = true, env = "S3KV_CONFIG")]
    pub config: Option<PathBuf>,

    /// Bucket holding the items
    #[arg(long, global = true, env = "AWS_BUCKET")]
    pub bucket: Option<String>,

    /// Access key identifier
    #[arg(long, global = true, env = "AWS_ACCESS_KEY_ID")]
    pub access_key_id: Option<String>,

    /// Region name, e.g. us-east-1
    #[arg(long, global = true, env = "AWS_DEFAULT_REGION")]
    pub region: Option<String>,

    /// Secret access key, used when no secret file is readable
    #[arg(long, global = true, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    pub secret_access_key: Option<String>,

    /// File holding the secret access key
    #[arg(long, global = true, env = "S3KV_SECRET_FILE")]
    pub secret_file: Option<PathBuf>,

    /// Custom endpoint for S3-compatible services
    #[arg(long, global = true, env = "S3KV_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Use path-style addressing
    #[arg(long, global = true, default_value = "false")]
    pub force_path_style: bool,
}

impl StorageArgs {
    /// Load the config file and apply overrides on top of its `[storage]` section
    pub fn layered_settings(&self) -> kv_core::Result<Settings> {
        let manager = match &self.config {
            Some(path) => ConfigManager::with_path(path.clone()),
            None => ConfigManager::new()?,
        };
        let mut settings = manager.load()?.storage;
        self.apply(&mut settings);
        Ok(settings)
    }

    /// Layered settings, validated for use against a real backend
    pub fn load_settings(&self) -> kv_core::Result<Settings> {
        let settings = self.layered_settings()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Overlay the values given on the command line or in the environment
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(bucket) = &self.bucket {
            settings.bucket = bucket.clone();
        }
        if let Some(access_key_id) = &self.access_key_id {
            settings.access_key_id = access_key_id.clone();
        }
        if let Some(region) = &self.region {
            settings.region = region.clone();
        }
        if let Some(secret) = &self.secret_access_key {
            settings.secret_access_key = Some(secret.clone());
        }
        if let Some(path) = &self.secret_file {
            settings.secret_file = Some(path.clone());
        }
        if let Some(endpoint) = &self.endpoint {
            settings.endpoint = Some(endpoint.clone());
        }
        if self.force_path_style {
            settings.force_path_style = true;
        }
    }

    /// Build a proxy talking to the configured S3 backend
    pub fn connect(&self) -> kv_core::Result<StorageProxy> {
        let settings = self.load_settings()?;
        let factory = S3ClientFactory::from_settings(&settings);
        StorageProxy::from_settings(&settings, Arc::new(factory))
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Store a value under a key
    Set(set::SetArgs),

    /// Print the value stored under a key
    Get(get::GetArgs),

    /// Remove a single key
    Rm(rm::RmArgs),

    /// List keys under a prefix
    Ls(ls::LsArgs),

    /// Remove every key under a prefix
    Clear(clear::ClearArgs),

    /// Serve the HTTP API
    Serve(serve::ServeArgs),
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let output_config = OutputConfig {
        json: cli.json,
        no_color: cli.no_color,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Set(args) => set::execute(args, &cli.storage, output_config).await,
        Commands::Get(args) => get::execute(args, &cli.storage, output_config).await,
        Commands::Rm(args) => rm::execute(args, &cli.storage, output_config).await,
        Commands::Ls(args) => ls::execute(args, &cli.storage, output_config).await,
        Commands::Clear(args) => clear::execute(args, &cli.storage, output_config).await,
        Commands::Serve(args) => serve::execute(args, &cli.storage, output_config).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "s3kv", "get", "k1", "--json", "--bucket", "b", "--region", "eu-west-1",
        ])
        .unwrap();

        assert!(cli.json);
        assert_eq!(cli.storage.bucket.as_deref(), Some("b"));
        assert_eq!(cli.storage.region.as_deref(), Some("eu-west-1"));
        assert!(matches!(cli.command, Commands::Get(_)));
    }

    #[test]
    fn test_cli_ls_defaults() {
        let cli = Cli::try_parse_from(["s3kv", "ls"]).unwrap();
        match cli.command {
            Commands::Ls(args) => {
                assert_eq!(args.prefix, "");
                assert_eq!(args.limit, 1000);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_rejects_missing_value() {
        assert!(Cli::try_parse_from(["s3kv", "set", "k1"]).is_err());
    }

    #[test]
    fn test_apply_overrides_settings() {
        let args = StorageArgs {
            bucket: Some("override".into()),
            secret_file: Some(PathBuf::from("/tmp/secret")),
            force_path_style: true,
            ..Default::default()
        };
        let mut settings = Settings::new("from-file", "AKID");
        args.apply(&mut settings);

        assert_eq!(settings.bucket, "override");
        assert_eq!(settings.access_key_id, "AKID");
        assert_eq!(settings.region, "us-east-1");
        assert_eq!(settings.secret_file, Some(PathBuf::from("/tmp/secret")));
        assert!(settings.force_path_style);
    }

    #[test]
    fn test_load_settings_from_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            "schema_version = 1\n\n[storage]\nbucket = \"items\"\naccess_key_id = \"AKID\"\nregion = \"eu-central-1\"\n",
        )
        .unwrap();

        let args = StorageArgs {
            config: Some(path),
            ..Default::default()
        };
        let settings = args.load_settings().unwrap();

        assert_eq!(settings.bucket, "items");
        assert_eq!(settings.region, "eu-central-1");
    }

    #[test]
    fn test_load_settings_requires_bucket() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let args = StorageArgs {
            config: Some(temp_dir.path().join("missing.toml")),
            ..Default::default()
        };

        let err = args.load_settings().unwrap_err();
        assert_eq!(err.kind(), kv_core::ErrorKind::Config);
    }
}
