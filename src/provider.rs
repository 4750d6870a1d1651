//! Provider trait definitions for the cloud collaborator.
//!
//! A [`Provider`] hands out clients scoped either to the caller's long-lived
//! keys (identity only, used once at login) or to the temporary credentials
//! stored in a session. The scoped client traits cover exactly the read-only
//! calls the gateway issues.

use crate::error::ProviderError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Result type for provider calls.
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Long-lived access key pair supplied at login.
#[derive(Clone)]
pub struct Credentials {
    pub access_key: String,
    pub secret_key: String,
}

impl Credentials {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Who the identity service says the caller is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerIdentity {
    pub account: Option<String>,
    pub arn: Option<String>,
    pub user_id: Option<String>,
}

/// Temporary credentials issued by the identity service.
#[derive(Clone)]
pub struct IssuedCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub expiration: DateTime<Utc>,
}

impl std::fmt::Debug for IssuedCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("expiration", &self.expiration)
            .finish_non_exhaustive()
    }
}

/// What a provider client needs to act on behalf of a session.
#[derive(Clone)]
pub struct SessionScope {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub region: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for SessionScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionScope")
            .field("access_key_id", &self.access_key_id)
            .field("region", &self.region)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// Raw cluster description as the provider reports it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterInfo {
    pub name: Option<String>,
    pub arn: Option<String>,
    pub status: Option<String>,
    pub running_tasks_count: i32,
    pub pending_tasks_count: i32,
    pub active_services_count: i32,
}

/// Raw service description as the provider reports it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceInfo {
    pub name: Option<String>,
    pub arn: Option<String>,
    pub status: Option<String>,
    pub desired_count: i32,
    pub running_count: i32,
    pub pending_count: i32,
    /// Status of every deployment (`PRIMARY`, `ACTIVE`, `INACTIVE`)
    pub deployment_statuses: Vec<String>,
}

/// One entry of the bucket listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketInfo {
    pub name: String,
    pub creation_date: Option<DateTime<Utc>>,
}

/// One page of an object listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectPage {
    /// Sizes in bytes of the objects on this page
    pub sizes: Vec<u64>,
    /// Continuation token for the next page, `None` on the last page
    pub next_token: Option<String>,
}

/// Provider represents the cloud collaborator.
///
/// All implementations must be `Send + Sync`; one instance is shared by
/// every request handler.
///
/// # Implementations
///
/// - **SDK-based**: AWS (STS, ECS, S3)
/// - **Testing**: Mock provider with error injection
#[async_trait]
pub trait Provider: Send + Sync {
    /// Returns the provider name (e.g., "aws", "mock").
    fn name(&self) -> &str;

    /// Builds an identity client scoped to long-lived credentials.
    ///
    /// # Errors
    ///
    /// [`ProviderError::Transport`] if the client cannot be constructed.
    async fn identity(
        &self,
        credentials: &Credentials,
        region: &str,
    ) -> ProviderResult<Box<dyn IdentityService>>;

    /// Builds a container-service client scoped to a session.
    async fn compute(&self, scope: &SessionScope) -> ProviderResult<Box<dyn ComputeService>>;

    /// Builds an object-storage client scoped to a session.
    async fn storage(&self, scope: &SessionScope) -> ProviderResult<Box<dyn StorageService>>;
}

/// Identity service (STS).
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Confirms the credentials are valid, not just well-formed.
    async fn verify_caller(&self) -> ProviderResult<CallerIdentity>;

    /// Exchanges the credentials for temporary ones valid for `duration`.
    async fn issue_session_token(&self, duration: Duration) -> ProviderResult<IssuedCredentials>;
}

/// Container service (ECS).
#[async_trait]
pub trait ComputeService: Send + Sync {
    /// Lists every cluster ARN, following pagination.
    async fn list_clusters(&self) -> ProviderResult<Vec<String>>;

    /// Describes clusters by name or ARN. Unknown clusters are omitted.
    async fn describe_clusters(&self, clusters: &[String]) -> ProviderResult<Vec<ClusterInfo>>;

    /// Lists every service ARN in a cluster, following pagination.
    async fn list_services(&self, cluster: &str) -> ProviderResult<Vec<String>>;

    /// Describes services of a cluster by name or ARN.
    async fn describe_services(
        &self,
        cluster: &str,
        services: &[String],
    ) -> ProviderResult<Vec<ServiceInfo>>;
}

/// Object storage (S3).
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Lists buckets owned by the caller.
    async fn list_buckets(&self) -> ProviderResult<Vec<BucketInfo>>;

    /// Returns the bucket's region.
    ///
    /// # Errors
    ///
    /// [`ProviderError::NotFound`] if the bucket does not exist.
    async fn bucket_region(&self, bucket: &str) -> ProviderResult<String>;

    /// Returns true when versioning is `Enabled`.
    async fn versioning_enabled(&self, bucket: &str) -> ProviderResult<bool>;

    /// Returns true when a public-access-block configuration exists.
    async fn public_access_blocked(&self, bucket: &str) -> ProviderResult<bool>;

    /// Fetches one page of the object listing, starting at `token`.
    async fn list_objects_page(
        &self,
        bucket: &str,
        token: Option<String>,
    ) -> ProviderResult<ObjectPage>;
}
