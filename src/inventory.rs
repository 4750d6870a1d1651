//! Inventory queries: call the scoped provider clients and reshape results.
//!
//! Every function here takes an already-authorized client, so the gate has
//! run before any of this executes.

use crate::error::ProviderError;
use crate::model::{BucketDetail, ClusterSummary, DeploymentStatus, ServiceSummary};
use crate::provider::{
    BucketInfo, ClusterInfo, ComputeService, ObjectPage, ProviderResult, ServiceInfo,
    StorageService,
};
use crate::{GateError, Result};
use futures::stream::{self, Stream, TryStreamExt};

/// Lists every cluster with its task and service counts.
///
/// # Errors
///
/// - [`GateError::NotFound`] with an empty `clusters` array when there are none
/// - [`GateError::Upstream`] for any provider failure
pub async fn list_clusters(compute: &dyn ComputeService) -> Result<Vec<ClusterSummary>> {
    let upstream = |e| GateError::upstream("Failed to fetch clusters", e);

    let arns = compute.list_clusters().await.map_err(upstream)?;
    if arns.is_empty() {
        return Err(GateError::empty_listing("No clusters found", "clusters"));
    }

    let clusters = compute.describe_clusters(&arns).await.map_err(upstream)?;
    Ok(clusters.into_iter().map(summarize_cluster).collect())
}

/// Lists the services of one cluster.
///
/// # Errors
///
/// - [`GateError::NotFound`] when the cluster does not exist
/// - [`GateError::NotFound`] with an empty `services` array when it has none
/// - [`GateError::Upstream`] for any other provider failure
pub async fn list_services(
    compute: &dyn ComputeService,
    cluster: &str,
) -> Result<Vec<ServiceSummary>> {
    let upstream = |e: ProviderError| {
        if e.is_not_found() {
            GateError::not_found("Cluster not found")
        } else {
            GateError::upstream("Failed to fetch services", e)
        }
    };

    let found = compute
        .describe_clusters(&[cluster.to_string()])
        .await
        .map_err(upstream)?;
    if found.is_empty() {
        return Err(GateError::not_found("Cluster not found"));
    }

    let arns = compute.list_services(cluster).await.map_err(upstream)?;
    if arns.is_empty() {
        return Err(GateError::empty_listing(
            "No services found in this cluster",
            "services",
        ));
    }

    let services = compute
        .describe_services(cluster, &arns)
        .await
        .map_err(upstream)?;
    Ok(services.into_iter().map(summarize_service).collect())
}

/// Describes every bucket the session can see.
///
/// A bucket whose detail lookup fails is logged and left out; callers cannot
/// tell a dropped bucket from an absent one.
///
/// # Errors
///
/// - [`GateError::NotFound`] with an empty `buckets` array when nothing remains
/// - [`GateError::Upstream`] when the bucket listing itself fails
pub async fn list_buckets(storage: &dyn StorageService) -> Result<Vec<BucketDetail>> {
    let buckets = storage
        .list_buckets()
        .await
        .map_err(|e| GateError::upstream("Failed to fetch bucket information", e))?;

    let mut details = Vec::with_capacity(buckets.len());
    for bucket in &buckets {
        match describe_bucket(storage, &bucket.name, Some(bucket)).await {
            Ok(detail) => details.push(detail),
            Err(e) => {
                tracing::warn!(bucket = %bucket.name, error = %e, "omitting bucket from listing");
            }
        }
    }

    if details.is_empty() {
        return Err(GateError::empty_listing("No buckets found", "buckets"));
    }

    Ok(details)
}

/// Describes one bucket.
///
/// # Errors
///
/// - [`GateError::NotFound`] when the bucket does not exist
/// - [`GateError::Upstream`] for any other provider failure
pub async fn bucket_detail(storage: &dyn StorageService, bucket: &str) -> Result<BucketDetail> {
    let listing = storage
        .list_buckets()
        .await
        .map_err(|e| GateError::upstream("Failed to fetch bucket details", e))?;
    let listed = listing.iter().find(|b| b.name == bucket);

    describe_bucket(storage, bucket, listed).await.map_err(|e| {
        if e.is_not_found() {
            GateError::not_found(format!(
                "Bucket '{}' not found or there is no detailed information.",
                bucket
            ))
        } else {
            GateError::upstream("Failed to fetch bucket details", e)
        }
    })
}

/// Gathers region, flags and usage totals for one bucket.
///
/// `listed` supplies the creation date when the bucket appears in the
/// caller's bucket listing.
async fn describe_bucket(
    storage: &dyn StorageService,
    bucket: &str,
    listed: Option<&BucketInfo>,
) -> ProviderResult<BucketDetail> {
    let region = storage.bucket_region(bucket).await?;
    let versioning_enabled = storage.versioning_enabled(bucket).await?;
    let public_access_blocked = storage.public_access_blocked(bucket).await?;
    let usage = object_usage(storage, bucket).await?;

    Ok(BucketDetail {
        name: bucket.to_string(),
        creation_date: listed.and_then(|b| b.creation_date),
        region,
        object_count: usage.object_count,
        total_size_bytes: usage.total_size_bytes,
        versioning_enabled,
        public_access_blocked,
    })
}

/// Running totals over an object listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObjectUsage {
    pub object_count: u64,
    pub total_size_bytes: u64,
}

impl ObjectUsage {
    fn add_page(mut self, page: &ObjectPage) -> Self {
        self.object_count += page.sizes.len() as u64;
        self.total_size_bytes += page.sizes.iter().sum::<u64>();
        self
    }
}

/// Lazy sequence of object-listing pages for a bucket.
///
/// Nothing is fetched until the stream is polled, and only one page is held at
/// a time. The stream ends after the page without a continuation token or at
/// the first error. Calling this again restarts the listing from the top.
pub fn object_pages<'a>(
    storage: &'a dyn StorageService,
    bucket: &'a str,
) -> impl Stream<Item = ProviderResult<ObjectPage>> + Send + 'a {
    enum Cursor {
        Start,
        Next(String),
        Done,
    }

    stream::try_unfold(Cursor::Start, move |cursor| async move {
        let token = match cursor {
            Cursor::Start => None,
            Cursor::Next(token) => Some(token),
            Cursor::Done => return ProviderResult::Ok(None),
        };

        let page = storage.list_objects_page(bucket, token).await?;
        let next = match page.next_token.clone() {
            Some(token) => Cursor::Next(token),
            None => Cursor::Done,
        };
        ProviderResult::Ok(Some((page, next)))
    })
}

/// Folds every object page of a bucket into totals.
pub async fn object_usage(storage: &dyn StorageService, bucket: &str) -> ProviderResult<ObjectUsage> {
    object_pages(storage, bucket)
        .try_fold(ObjectUsage::default(), |usage, page| async move {
            ProviderResult::Ok(usage.add_page(&page))
        })
        .await
}

fn summarize_cluster(c: ClusterInfo) -> ClusterSummary {
    ClusterSummary {
        cluster_name: c.name,
        cluster_arn: c.arn,
        status: c.status,
        running_tasks_count: c.running_tasks_count,
        pending_tasks_count: c.pending_tasks_count,
        active_services_count: c.active_services_count,
    }
}

fn summarize_service(s: ServiceInfo) -> ServiceSummary {
    let deployment_status = if s.deployment_statuses.iter().any(|d| d == "PRIMARY") {
        DeploymentStatus::Primary
    } else {
        DeploymentStatus::Unknown
    };

    ServiceSummary {
        service_name: s.name,
        service_arn: s.arn,
        status: s.status,
        desired_count: s.desired_count,
        running_count: s.running_count,
        pending_count: s.pending_count,
        deployment_status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{Credentials, Provider, SessionScope};
    use crate::providers::mock::{cluster_arn, service_arn, MockBucket, MockProvider};
    use chrono::{TimeZone, Utc};
    use futures::StreamExt;
    use std::time::Duration;

    async fn scope_for(provider: &MockProvider) -> SessionScope {
        provider.accept_credentials("AKIATEST", "secret").await;
        let issued = provider
            .identity(&Credentials::new("AKIATEST", "secret"), "us-east-1")
            .await
            .unwrap()
            .issue_session_token(Duration::from_secs(3600))
            .await
            .unwrap();
        SessionScope {
            access_key_id: issued.access_key_id,
            secret_access_key: issued.secret_access_key,
            session_token: issued.session_token,
            region: "us-east-1".to_string(),
            expires_at: Some(issued.expiration),
        }
    }

    fn cluster(name: &str) -> ClusterInfo {
        ClusterInfo {
            name: Some(name.to_string()),
            arn: Some(cluster_arn(name)),
            status: Some("ACTIVE".to_string()),
            running_tasks_count: 3,
            pending_tasks_count: 1,
            active_services_count: 2,
        }
    }

    fn service(cluster: &str, name: &str, deployments: &[&str]) -> ServiceInfo {
        ServiceInfo {
            name: Some(name.to_string()),
            arn: Some(service_arn(cluster, name)),
            status: Some("ACTIVE".to_string()),
            desired_count: 2,
            running_count: 1,
            pending_count: 1,
            deployment_statuses: deployments.iter().map(|d| d.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_list_clusters() {
        let provider = MockProvider::new();
        provider.add_cluster(cluster("alpha")).await;
        provider.add_cluster(cluster("beta")).await;
        let compute = provider.compute(&scope_for(&provider).await).await.unwrap();

        let clusters = list_clusters(compute.as_ref()).await.unwrap();
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].cluster_name.as_deref(), Some("alpha"));
        assert_eq!(clusters[0].running_tasks_count, 3);
        assert_eq!(clusters[1].cluster_arn, Some(cluster_arn("beta")));
    }

    #[tokio::test]
    async fn test_list_clusters_empty() {
        let provider = MockProvider::new();
        let compute = provider.compute(&scope_for(&provider).await).await.unwrap();

        let err = list_clusters(compute.as_ref()).await.unwrap_err();
        assert!(matches!(
            err,
            GateError::NotFound { collection: Some("clusters"), .. }
        ));
    }

    #[tokio::test]
    async fn test_list_clusters_upstream_failure() {
        let mut provider = MockProvider::new();
        provider.compute_error = Some(ProviderError::rejected("AccessDeniedException", "denied"));
        let compute = provider.compute(&scope_for(&provider).await).await.unwrap();

        let err = list_clusters(compute.as_ref()).await.unwrap_err();
        assert!(err.to_string().starts_with("Failed to fetch clusters: "));
    }

    #[tokio::test]
    async fn test_list_services_deployment_status() {
        let provider = MockProvider::new();
        provider.add_cluster(cluster("alpha")).await;
        provider
            .add_service("alpha", service("alpha", "api", &["ACTIVE", "PRIMARY"]))
            .await;
        provider
            .add_service("alpha", service("alpha", "worker", &["ACTIVE"]))
            .await;
        let compute = provider.compute(&scope_for(&provider).await).await.unwrap();

        let services = list_services(compute.as_ref(), "alpha").await.unwrap();
        assert_eq!(services.len(), 2);
        assert_eq!(services[0].deployment_status, DeploymentStatus::Primary);
        assert_eq!(services[1].deployment_status, DeploymentStatus::Unknown);
        assert_eq!(services[0].desired_count, 2);
    }

    #[tokio::test]
    async fn test_list_services_missing_cluster() {
        let provider = MockProvider::new();
        let compute = provider.compute(&scope_for(&provider).await).await.unwrap();

        let err = list_services(compute.as_ref(), "ghost").await.unwrap_err();
        assert_eq!(err.to_string(), "Cluster not found");
        assert!(matches!(err, GateError::NotFound { collection: None, .. }));
    }

    #[tokio::test]
    async fn test_list_services_empty_cluster() {
        let provider = MockProvider::new();
        provider.add_cluster(cluster("alpha")).await;
        let compute = provider.compute(&scope_for(&provider).await).await.unwrap();

        let err = list_services(compute.as_ref(), "alpha").await.unwrap_err();
        assert!(matches!(
            err,
            GateError::NotFound { collection: Some("services"), .. }
        ));
    }

    #[tokio::test]
    async fn test_object_pages_are_lazy_and_restartable() {
        let provider = MockProvider::new();
        provider
            .add_bucket(MockBucket::new("data").with_objects(vec![10, 20, 30, 40, 50]))
            .await;
        provider.set_page_size(2).await;
        let storage = provider.storage(&scope_for(&provider).await).await.unwrap();

        let first: Vec<_> = object_pages(storage.as_ref(), "data")
            .take(1)
            .collect::<Vec<_>>()
            .await;
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].as_ref().unwrap().sizes, vec![10, 20]);

        let all: Vec<ObjectPage> = object_pages(storage.as_ref(), "data")
            .try_collect()
            .await
            .unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[2].sizes, vec![50]);
    }

    #[tokio::test]
    async fn test_object_usage_totals() {
        let provider = MockProvider::new();
        provider
            .add_bucket(MockBucket::new("data").with_objects(vec![1, 2, 3, 4, 5, 6, 7]))
            .await;
        provider.set_page_size(3).await;
        let storage = provider.storage(&scope_for(&provider).await).await.unwrap();

        let usage = object_usage(storage.as_ref(), "data").await.unwrap();
        assert_eq!(
            usage,
            ObjectUsage {
                object_count: 7,
                total_size_bytes: 28
            }
        );
    }

    #[tokio::test]
    async fn test_empty_bucket_usage() {
        let provider = MockProvider::new();
        provider.add_bucket(MockBucket::new("empty")).await;
        let storage = provider.storage(&scope_for(&provider).await).await.unwrap();

        let usage = object_usage(storage.as_ref(), "empty").await.unwrap();
        assert_eq!(usage, ObjectUsage::default());
    }

    #[tokio::test]
    async fn test_bucket_detail() {
        let created = Utc.with_ymd_and_hms(2023, 1, 2, 3, 4, 5).unwrap();
        let provider = MockProvider::new();
        provider
            .add_bucket(
                MockBucket::new("assets")
                    .with_creation_date(Some(created))
                    .with_region("eu-west-1")
                    .with_versioning(true)
                    .with_public_access_block(true)
                    .with_objects(vec![100, 200]),
            )
            .await;
        let storage = provider.storage(&scope_for(&provider).await).await.unwrap();

        let detail = bucket_detail(storage.as_ref(), "assets").await.unwrap();
        assert_eq!(
            detail,
            BucketDetail {
                name: "assets".to_string(),
                creation_date: Some(created),
                region: "eu-west-1".to_string(),
                object_count: 2,
                total_size_bytes: 300,
                versioning_enabled: true,
                public_access_blocked: true,
            }
        );
    }

    #[tokio::test]
    async fn test_bucket_detail_not_found() {
        let provider = MockProvider::new();
        let storage = provider.storage(&scope_for(&provider).await).await.unwrap();

        let err = bucket_detail(storage.as_ref(), "ghost").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Bucket 'ghost' not found or there is no detailed information."
        );
    }

    #[tokio::test]
    async fn test_bucket_detail_access_denied_is_upstream() {
        let mut provider = MockProvider::new();
        provider.add_bucket(MockBucket::new("locked")).await;
        provider.bucket_errors.insert(
            "locked".to_string(),
            ProviderError::rejected("AccessDenied", "Access Denied"),
        );
        let storage = provider.storage(&scope_for(&provider).await).await.unwrap();

        let err = bucket_detail(storage.as_ref(), "locked").await.unwrap_err();
        assert!(matches!(err, GateError::Upstream { .. }));
    }

    #[tokio::test]
    async fn test_list_buckets_omits_failing_bucket() {
        let mut provider = MockProvider::new();
        provider.add_bucket(MockBucket::new("good")).await;
        provider.add_bucket(MockBucket::new("bad")).await;
        provider.bucket_errors.insert(
            "bad".to_string(),
            ProviderError::Transport("connection reset".to_string()),
        );
        let storage = provider.storage(&scope_for(&provider).await).await.unwrap();

        let buckets = list_buckets(storage.as_ref()).await.unwrap();
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].name, "good");
    }

    #[tokio::test]
    async fn test_list_buckets_all_failing_is_empty_listing() {
        let mut provider = MockProvider::new();
        provider.add_bucket(MockBucket::new("bad")).await;
        provider.bucket_errors.insert(
            "bad".to_string(),
            ProviderError::rejected("AccessDenied", "Access Denied"),
        );
        let storage = provider.storage(&scope_for(&provider).await).await.unwrap();

        let err = list_buckets(storage.as_ref()).await.unwrap_err();
        assert!(matches!(
            err,
            GateError::NotFound { collection: Some("buckets"), .. }
        ));
    }

    #[tokio::test]
    async fn test_list_buckets_listing_failure() {
        let mut provider = MockProvider::new();
        provider.storage_error = Some(ProviderError::Transport("timeout".to_string()));
        let storage = provider.storage(&scope_for(&provider).await).await.unwrap();

        let err = list_buckets(storage.as_ref()).await.unwrap_err();
        assert!(err
            .to_string()
            .starts_with("Failed to fetch bucket information: "));
    }
}
