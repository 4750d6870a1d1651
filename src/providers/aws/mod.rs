//! AWS provider.
//!
//! This provider talks to STS, ECS and S3 using the official AWS SDK.
//!
//! # Requirements
//!
//! - Network access to the AWS endpoints of the session's region, or a custom
//!   endpoint (`endpoint` option) such as LocalStack
//! - No ambient credentials: every client is built from the keys supplied at
//!   login or from the temporary credentials stored in the session
//!
//! # Example
//!
//! ```no_run
//! use awsgate::{factory, Config, ProviderType};
//! use awsgate::provider::Credentials;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     awsgate::init();
//!     let config = Config::new(ProviderType::Aws)
//!         .with_option("endpoint", "http://localhost:4566");
//!
//!     let provider = factory::new_provider(config)?;
//!     let identity = provider
//!         .identity(&Credentials::new("test", "test"), "us-east-1")
//!         .await?;
//!     let caller = identity.verify_caller().await?;
//!     println!("account: {:?}", caller.account);
//!
//!     Ok(())
//! }
//! ```

mod compute;
mod identity;
mod storage;

pub use compute::AwsCompute;
pub use identity::AwsIdentity;
pub use storage::AwsStorage;

use crate::error::ProviderError;
use crate::provider::{
    ComputeService, Credentials, IdentityService, Provider, ProviderResult, SessionScope,
    StorageService,
};
use crate::Config;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_sts::config::Credentials as SdkCredentials;
use aws_sdk_sts::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use std::time::SystemTime;

/// AWS provider.
///
/// Holds no clients itself; each scoped client gets a fresh SDK config with
/// static credentials so sessions never share signing state.
pub struct AwsProvider {
    endpoint: Option<String>,
}

impl AwsProvider {
    /// Creates a new AWS provider from configuration.
    pub fn new(config: Config) -> Self {
        Self {
            endpoint: config.get_option("endpoint").cloned(),
        }
    }

    async fn sdk_config(&self, credentials: SdkCredentials, region: &str) -> SdkConfig {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .credentials_provider(credentials);

        // Use custom endpoint if provided (for LocalStack testing)
        if let Some(ref endpoint) = self.endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        loader.load().await
    }

    async fn session_config(&self, scope: &SessionScope) -> SdkConfig {
        let expiry = scope.expires_at.map(SystemTime::from);
        let credentials = SdkCredentials::new(
            scope.access_key_id.clone(),
            scope.secret_access_key.clone(),
            Some(scope.session_token.clone()),
            expiry,
            "awsgate-session",
        );
        self.sdk_config(credentials, &scope.region).await
    }
}

#[async_trait]
impl Provider for AwsProvider {
    fn name(&self) -> &str {
        "aws"
    }

    async fn identity(
        &self,
        credentials: &Credentials,
        region: &str,
    ) -> ProviderResult<Box<dyn IdentityService>> {
        let static_credentials = SdkCredentials::new(
            credentials.access_key.clone(),
            credentials.secret_key.clone(),
            None,
            None,
            "awsgate-login",
        );
        let config = self.sdk_config(static_credentials, region).await;
        Ok(Box::new(AwsIdentity::new(aws_sdk_sts::Client::new(&config))))
    }

    async fn compute(&self, scope: &SessionScope) -> ProviderResult<Box<dyn ComputeService>> {
        let config = self.session_config(scope).await;
        Ok(Box::new(AwsCompute::new(aws_sdk_ecs::Client::new(&config))))
    }

    async fn storage(&self, scope: &SessionScope) -> ProviderResult<Box<dyn StorageService>> {
        let config = self.session_config(scope).await;
        let mut builder = aws_sdk_s3::config::Builder::from(&config);
        if self.endpoint.is_some() {
            // LocalStack and most S3 emulators do not serve virtual-hosted buckets
            builder = builder.force_path_style(true);
        }
        Ok(Box::new(AwsStorage::new(aws_sdk_s3::Client::from_conf(
            builder.build(),
        ))))
    }
}

/// Error codes that mean "the thing you asked about does not exist".
const NOT_FOUND_CODES: &[&str] = &[
    "NoSuchBucket",
    "NotFound",
    "ClusterNotFoundException",
    "ServiceNotFoundException",
];

/// Classifies an SDK failure.
///
/// Service responses become [`ProviderError::Rejected`] (or `NotFound` for
/// the codes above); everything else is a transport failure.
pub(crate) fn classify<E, R>(err: SdkError<E, R>) -> ProviderError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    match &err {
        SdkError::ServiceError(_) => {
            let code = err.code().unwrap_or("Unknown").to_string();
            let message = err.message().unwrap_or_default().to_string();
            if NOT_FOUND_CODES.contains(&code.as_str()) {
                ProviderError::NotFound(if message.is_empty() { code } else { message })
            } else {
                ProviderError::Rejected { code, message }
            }
        }
        _ => ProviderError::Transport(DisplayErrorContext(&err).to_string()),
    }
}

/// Converts an SDK timestamp to chrono.
pub(crate) fn to_chrono(ts: &aws_sdk_sts::primitives::DateTime) -> Option<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::from_timestamp(ts.secs(), ts.subsec_nanos())
}

/// Registers the AWS provider with the factory.
pub fn register() {
    crate::factory::register_provider("aws", |cfg| Ok(Box::new(AwsProvider::new(cfg))));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProviderType;

    #[test]
    fn test_endpoint_option() {
        let config = Config::new(ProviderType::Aws).with_option("endpoint", "http://localhost:4566");
        let provider = AwsProvider::new(config);
        assert_eq!(provider.endpoint.as_deref(), Some("http://localhost:4566"));
        assert_eq!(provider.name(), "aws");
    }

    #[test]
    fn test_no_endpoint_by_default() {
        let provider = AwsProvider::new(Config::new(ProviderType::Aws));
        assert!(provider.endpoint.is_none());
    }

    #[test]
    fn test_to_chrono() {
        let ts = aws_sdk_sts::primitives::DateTime::from_secs(1_700_000_000);
        let converted = to_chrono(&ts).unwrap();
        assert_eq!(converted.timestamp(), 1_700_000_000);
    }
}
