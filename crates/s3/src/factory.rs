//! Client factory
//!
//! Builds a fresh SDK client for every proxy operation. Nothing is pooled:
//! the client is dropped together with the operation that asked for it.

use async_trait::async_trait;
use aws_sdk_s3::config::BehaviorVersion;

use kv_core::{ClientFactory, Credentials, ObjectStore, Result, Settings};

use crate::client::S3Client;
use crate::region::Region;

/// Factory producing [`S3Client`]s bound to one set of credentials
#[derive(Debug, Clone, Default)]
pub struct S3ClientFactory {
    endpoint: Option<String>,
    force_path_style: bool,
}

impl S3ClientFactory {
    /// Create a factory targeting the AWS endpoints
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a factory from the endpoint settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            endpoint: settings.endpoint.clone(),
            force_path_style: settings.force_path_style,
        }
    }

    /// Target an S3-compatible endpoint instead of AWS
    pub fn with_endpoint(mut self, endpoint: impl Into<String>, force_path_style: bool) -> Self {
        self.endpoint = Some(endpoint.into());
        self.force_path_style = force_path_style;
        self
    }

    /// SDK configuration for `credentials`
    ///
    /// Region, credentials and endpoint come only from the arguments; the
    /// shared AWS profile and `AWS_*` environment are never consulted.
    /// An unknown region fails here, before any request is sent.
    pub fn sdk_config(&self, credentials: &Credentials) -> Result<aws_sdk_s3::Config> {
        let region = Region::parse(&credentials.region)?;

        let sdk_credentials = aws_credential_types::Credentials::new(
            credentials.access_key_id.clone(),
            credentials.secret_access_key.clone(),
            None, // session token
            None, // expiry
            "s3kv-static-credentials",
        );

        let mut builder = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new(region.name()))
            .credentials_provider(sdk_credentials)
            .force_path_style(self.force_path_style);

        if let Some(endpoint) = &self.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        tracing::debug!(region = %region, endpoint = ?self.endpoint, "Built S3 client config");
        Ok(builder.build())
    }

    /// Build a client for `credentials`
    pub fn build(&self, credentials: &Credentials) -> Result<S3Client> {
        let config = self.sdk_config(credentials)?;
        Ok(S3Client::new(aws_sdk_s3::Client::from_conf(config)))
    }
}

#[async_trait]
impl ClientFactory for S3ClientFactory {
    async fn connect(&self, credentials: &Credentials) -> Result<Box<dyn ObjectStore>> {
        Ok(Box::new(self.build(credentials)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::config::ProvideCredentials;
    use kv_core::Error;

    fn credentials(region: &str) -> Credentials {
        Credentials {
            access_key_id: "AKID".into(),
            secret_access_key: "secret".into(),
            region: region.into(),
        }
    }

    #[tokio::test]
    async fn test_unknown_region_is_config_error() {
        let factory = S3ClientFactory::new();
        let result = factory.connect(&credentials("moon-base-1")).await;
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_builds_client_for_known_region() {
        let factory = S3ClientFactory::new().with_endpoint("http://localhost:9000", true);
        assert!(factory.build(&credentials("us-east-1")).is_ok());
    }

    #[tokio::test]
    async fn test_config_uses_only_given_region_and_credentials() {
        let factory = S3ClientFactory::new();
        let config = factory.sdk_config(&credentials("eu-west-1")).unwrap();

        assert_eq!(config.region().map(|r| r.as_ref()), Some("eu-west-1"));

        let provider = config.credentials_provider().unwrap();
        let resolved = provider.provide_credentials().await.unwrap();
        assert_eq!(resolved.access_key_id(), "AKID");
        assert_eq!(resolved.secret_access_key(), "secret");
    }

    #[test]
    fn test_from_settings() {
        let settings = Settings {
            endpoint: Some("http://localhost:9000".into()),
            force_path_style: true,
            ..Settings::new("kv-bucket", "AKID")
        };
        let factory = S3ClientFactory::from_settings(&settings);
        assert_eq!(factory.endpoint.as_deref(), Some("http://localhost:9000"));
        assert!(factory.force_path_style);
    }
}
