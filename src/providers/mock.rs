//! Mock provider for testing.
//!
//! This provider keeps a complete in-memory inventory (clusters, services,
//! buckets, objects) and issues real-looking temporary credentials, with error
//! injection to simulate provider failures.

use crate::error::ProviderError;
use crate::provider::*;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Mock provider for testing.
///
/// # Example
///
/// ```
/// use awsgate::providers::mock::{MockBucket, MockProvider};
/// use awsgate::provider::{Credentials, Provider};
/// use awsgate::ProviderError;
///
/// #[tokio::main]
/// async fn main() {
///     let mut provider = MockProvider::new();
///     provider.accept_credentials("AKIAEXAMPLE", "secret").await;
///     provider.add_bucket(MockBucket::new("logs").with_objects(vec![10, 20])).await;
///
///     // Test error conditions
///     provider.identity_error = Some(ProviderError::Transport("timeout".to_string()));
///
///     let identity = provider
///         .identity(&Credentials::new("AKIAEXAMPLE", "secret"), "us-east-1")
///         .await
///         .unwrap();
///     assert!(identity.verify_caller().await.is_err());
/// }
/// ```
pub struct MockProvider {
    state: Arc<RwLock<MockState>>,

    /// Error to return from `verify_caller()`
    pub identity_error: Option<ProviderError>,
    /// Error to return from `issue_session_token()`
    pub issue_error: Option<ProviderError>,
    /// Error to return from every compute call
    pub compute_error: Option<ProviderError>,
    /// Error to return from `list_buckets()`
    pub storage_error: Option<ProviderError>,
    /// Per-bucket error returned from every call naming that bucket
    pub bucket_errors: HashMap<String, ProviderError>,
    /// Overrides the lifetime of issued tokens (may be negative)
    pub token_lifetime: Option<chrono::Duration>,
}

#[derive(Default)]
struct MockState {
    credentials: HashMap<String, String>,
    issued_tokens: HashSet<String>,
    clusters: Vec<MockCluster>,
    buckets: Vec<MockBucket>,
    page_size: usize,
}

struct MockCluster {
    info: ClusterInfo,
    services: Vec<ServiceInfo>,
}

/// A bucket fixture.
#[derive(Debug, Clone)]
pub struct MockBucket {
    pub name: String,
    pub creation_date: Option<DateTime<Utc>>,
    pub region: String,
    pub versioning_enabled: bool,
    pub public_access_blocked: bool,
    pub object_sizes: Vec<u64>,
}

impl MockBucket {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            creation_date: Some(Utc::now()),
            region: "us-east-1".to_string(),
            versioning_enabled: false,
            public_access_blocked: false,
            object_sizes: Vec::new(),
        }
    }

    pub fn with_creation_date(mut self, date: Option<DateTime<Utc>>) -> Self {
        self.creation_date = date;
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_versioning(mut self, enabled: bool) -> Self {
        self.versioning_enabled = enabled;
        self
    }

    pub fn with_public_access_block(mut self, blocked: bool) -> Self {
        self.public_access_blocked = blocked;
        self
    }

    pub fn with_objects(mut self, sizes: Vec<u64>) -> Self {
        self.object_sizes = sizes;
        self
    }
}

impl MockProvider {
    /// Creates a new mock provider with an empty inventory.
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(MockState {
                page_size: 1000,
                ..Default::default()
            })),
            identity_error: None,
            issue_error: None,
            compute_error: None,
            storage_error: None,
            bucket_errors: HashMap::new(),
            token_lifetime: None,
        }
    }

    /// Creates a provider seeded with a small demo inventory.
    ///
    /// Accepts the key pair `AKIADEMO` / `demo-secret`.
    pub fn with_demo_data() -> Self {
        let web = ServiceInfo {
            name: Some("web".to_string()),
            arn: Some(service_arn("demo", "web")),
            status: Some("ACTIVE".to_string()),
            desired_count: 2,
            running_count: 2,
            pending_count: 0,
            deployment_statuses: vec!["PRIMARY".to_string()],
        };
        let demo = MockCluster {
            info: ClusterInfo {
                name: Some("demo".to_string()),
                arn: Some(cluster_arn("demo")),
                status: Some("ACTIVE".to_string()),
                running_tasks_count: 2,
                pending_tasks_count: 0,
                active_services_count: 1,
            },
            services: vec![web],
        };

        let state = MockState {
            credentials: HashMap::from([("AKIADEMO".to_string(), "demo-secret".to_string())]),
            clusters: vec![demo],
            buckets: vec![MockBucket::new("demo-assets")
                .with_versioning(true)
                .with_public_access_block(true)
                .with_objects(vec![512, 2048, 4096])],
            page_size: 1000,
            ..Default::default()
        };

        Self {
            state: Arc::new(RwLock::new(state)),
            ..Self::new()
        }
    }

    /// Registers a key pair the identity service will accept.
    pub async fn accept_credentials(&self, access_key: impl Into<String>, secret: impl Into<String>) {
        let mut state = self.state.write().await;
        state.credentials.insert(access_key.into(), secret.into());
    }

    /// Pre-populates a cluster.
    pub async fn add_cluster(&self, info: ClusterInfo) {
        let mut state = self.state.write().await;
        state.clusters.push(MockCluster {
            info,
            services: Vec::new(),
        });
    }

    /// Pre-populates a service in an existing cluster (matched by name).
    pub async fn add_service(&self, cluster: &str, service: ServiceInfo) {
        let mut state = self.state.write().await;
        if let Some(c) = state
            .clusters
            .iter_mut()
            .find(|c| c.info.name.as_deref() == Some(cluster))
        {
            c.services.push(service);
        }
    }

    /// Pre-populates a bucket.
    pub async fn add_bucket(&self, bucket: MockBucket) {
        let mut state = self.state.write().await;
        state.buckets.push(bucket);
    }

    /// Sets how many objects a listing page holds.
    pub async fn set_page_size(&self, size: usize) {
        let mut state = self.state.write().await;
        state.page_size = size.max(1);
    }

    /// Returns how many session tokens have been issued so far.
    pub async fn issued_token_count(&self) -> usize {
        self.state.read().await.issued_tokens.len()
    }

    async fn token_known(&self, scope: &SessionScope) -> bool {
        self.state
            .read()
            .await
            .issued_tokens
            .contains(&scope.session_token)
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds an ECS-style cluster ARN for fixtures.
pub fn cluster_arn(name: &str) -> String {
    format!("arn:aws:ecs:us-east-1:000000000000:cluster/{}", name)
}

/// Builds an ECS-style service ARN for fixtures.
pub fn service_arn(cluster: &str, name: &str) -> String {
    format!("arn:aws:ecs:us-east-1:000000000000:service/{}/{}", cluster, name)
}

fn invalid_token() -> ProviderError {
    ProviderError::rejected(
        "UnrecognizedClientException",
        "The security token included in the request is invalid",
    )
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn identity(
        &self,
        credentials: &Credentials,
        _region: &str,
    ) -> ProviderResult<Box<dyn IdentityService>> {
        Ok(Box::new(MockIdentity {
            state: self.state.clone(),
            credentials: credentials.clone(),
            identity_error: self.identity_error.clone(),
            issue_error: self.issue_error.clone(),
            token_lifetime: self.token_lifetime,
        }))
    }

    async fn compute(&self, scope: &SessionScope) -> ProviderResult<Box<dyn ComputeService>> {
        let error = if self.token_known(scope).await {
            self.compute_error.clone()
        } else {
            Some(invalid_token())
        };
        Ok(Box::new(MockCompute {
            state: self.state.clone(),
            error,
        }))
    }

    async fn storage(&self, scope: &SessionScope) -> ProviderResult<Box<dyn StorageService>> {
        let error = if self.token_known(scope).await {
            self.storage_error.clone()
        } else {
            Some(invalid_token())
        };
        Ok(Box::new(MockStorage {
            state: self.state.clone(),
            error,
            bucket_errors: self.bucket_errors.clone(),
        }))
    }
}

struct MockIdentity {
    state: Arc<RwLock<MockState>>,
    credentials: Credentials,
    identity_error: Option<ProviderError>,
    issue_error: Option<ProviderError>,
    token_lifetime: Option<chrono::Duration>,
}

impl MockIdentity {
    async fn check(&self) -> ProviderResult<()> {
        let state = self.state.read().await;
        match state.credentials.get(&self.credentials.access_key) {
            Some(secret) if *secret == self.credentials.secret_key => Ok(()),
            Some(_) => Err(ProviderError::rejected(
                "SignatureDoesNotMatch",
                "The request signature we calculated does not match the signature you provided",
            )),
            None => Err(ProviderError::rejected(
                "InvalidClientTokenId",
                "The security token included in the request is invalid",
            )),
        }
    }
}

#[async_trait]
impl IdentityService for MockIdentity {
    async fn verify_caller(&self) -> ProviderResult<CallerIdentity> {
        if let Some(ref err) = self.identity_error {
            return Err(err.clone());
        }
        self.check().await?;

        Ok(CallerIdentity {
            account: Some("000000000000".to_string()),
            arn: Some(format!(
                "arn:aws:iam::000000000000:user/{}",
                self.credentials.access_key
            )),
            user_id: Some(self.credentials.access_key.clone()),
        })
    }

    async fn issue_session_token(&self, duration: Duration) -> ProviderResult<IssuedCredentials> {
        if let Some(ref err) = self.issue_error {
            return Err(err.clone());
        }
        self.check().await?;

        let lifetime = match self.token_lifetime {
            Some(lifetime) => lifetime,
            None => chrono::Duration::from_std(duration)
                .map_err(|e| ProviderError::Transport(e.to_string()))?,
        };

        let token = uuid::Uuid::new_v4().simple().to_string();
        let mut state = self.state.write().await;
        state.issued_tokens.insert(token.clone());

        Ok(IssuedCredentials {
            access_key_id: format!("ASIA{}", &token[..16].to_ascii_uppercase()),
            secret_access_key: uuid::Uuid::new_v4().simple().to_string(),
            session_token: token,
            expiration: Utc::now() + lifetime,
        })
    }
}

struct MockCompute {
    state: Arc<RwLock<MockState>>,
    error: Option<ProviderError>,
}

impl MockCompute {
    fn fail(&self) -> ProviderResult<()> {
        match self.error {
            Some(ref err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

fn matches_cluster(info: &ClusterInfo, key: &str) -> bool {
    info.name.as_deref() == Some(key) || info.arn.as_deref() == Some(key)
}

#[async_trait]
impl ComputeService for MockCompute {
    async fn list_clusters(&self) -> ProviderResult<Vec<String>> {
        self.fail()?;
        let state = self.state.read().await;
        Ok(state
            .clusters
            .iter()
            .filter_map(|c| c.info.arn.clone())
            .collect())
    }

    async fn describe_clusters(&self, clusters: &[String]) -> ProviderResult<Vec<ClusterInfo>> {
        self.fail()?;
        let state = self.state.read().await;
        Ok(clusters
            .iter()
            .filter_map(|key| state.clusters.iter().find(|c| matches_cluster(&c.info, key)))
            .map(|c| c.info.clone())
            .collect())
    }

    async fn list_services(&self, cluster: &str) -> ProviderResult<Vec<String>> {
        self.fail()?;
        let state = self.state.read().await;
        let found = state
            .clusters
            .iter()
            .find(|c| matches_cluster(&c.info, cluster))
            .ok_or_else(|| ProviderError::NotFound(format!("cluster {}", cluster)))?;
        Ok(found.services.iter().filter_map(|s| s.arn.clone()).collect())
    }

    async fn describe_services(
        &self,
        cluster: &str,
        services: &[String],
    ) -> ProviderResult<Vec<ServiceInfo>> {
        self.fail()?;
        let state = self.state.read().await;
        let found = state
            .clusters
            .iter()
            .find(|c| matches_cluster(&c.info, cluster))
            .ok_or_else(|| ProviderError::NotFound(format!("cluster {}", cluster)))?;
        Ok(services
            .iter()
            .filter_map(|key| {
                found.services.iter().find(|s| {
                    s.arn.as_deref() == Some(key.as_str()) || s.name.as_deref() == Some(key.as_str())
                })
            })
            .cloned()
            .collect())
    }
}

struct MockStorage {
    state: Arc<RwLock<MockState>>,
    error: Option<ProviderError>,
    bucket_errors: HashMap<String, ProviderError>,
}

impl MockStorage {
    async fn with_bucket<T>(
        &self,
        bucket: &str,
        f: impl FnOnce(&MockBucket, usize) -> T,
    ) -> ProviderResult<T> {
        if let Some(ref err) = self.error {
            return Err(err.clone());
        }
        if let Some(err) = self.bucket_errors.get(bucket) {
            return Err(err.clone());
        }
        let state = self.state.read().await;
        state
            .buckets
            .iter()
            .find(|b| b.name == bucket)
            .map(|b| f(b, state.page_size))
            .ok_or_else(|| ProviderError::NotFound(format!("bucket {}", bucket)))
    }
}

#[async_trait]
impl StorageService for MockStorage {
    async fn list_buckets(&self) -> ProviderResult<Vec<BucketInfo>> {
        if let Some(ref err) = self.error {
            return Err(err.clone());
        }
        let state = self.state.read().await;
        Ok(state
            .buckets
            .iter()
            .map(|b| BucketInfo {
                name: b.name.clone(),
                creation_date: b.creation_date,
            })
            .collect())
    }

    async fn bucket_region(&self, bucket: &str) -> ProviderResult<String> {
        self.with_bucket(bucket, |b, _| b.region.clone()).await
    }

    async fn versioning_enabled(&self, bucket: &str) -> ProviderResult<bool> {
        self.with_bucket(bucket, |b, _| b.versioning_enabled).await
    }

    async fn public_access_blocked(&self, bucket: &str) -> ProviderResult<bool> {
        self.with_bucket(bucket, |b, _| b.public_access_blocked).await
    }

    async fn list_objects_page(
        &self,
        bucket: &str,
        token: Option<String>,
    ) -> ProviderResult<ObjectPage> {
        let start = match token {
            Some(t) => t
                .parse::<usize>()
                .map_err(|_| ProviderError::rejected("InvalidArgument", "bad continuation token"))?,
            None => 0,
        };

        self.with_bucket(bucket, |b, page_size| {
            let end = (start + page_size).min(b.object_sizes.len());
            let sizes = b.object_sizes.get(start..end).unwrap_or_default().to_vec();
            let next_token = (end < b.object_sizes.len()).then(|| end.to_string());
            ObjectPage { sizes, next_token }
        })
        .await
    }
}

/// Registers the mock provider with the factory.
pub fn register() {
    crate::factory::register_provider("mock", |_cfg| Ok(Box::new(MockProvider::with_demo_data())));
}
