//! ECS client.

use super::classify;
use crate::provider::{ClusterInfo, ComputeService, ProviderResult, ServiceInfo};
use async_trait::async_trait;
use aws_sdk_ecs::Client;

/// `DescribeClusters` accepts at most 100 clusters per call.
const DESCRIBE_CLUSTERS_BATCH: usize = 100;

/// `DescribeServices` accepts at most 10 services per call.
const DESCRIBE_SERVICES_BATCH: usize = 10;

/// ECS client scoped to a session.
pub struct AwsCompute {
    client: Client,
}

impl AwsCompute {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ComputeService for AwsCompute {
    async fn list_clusters(&self) -> ProviderResult<Vec<String>> {
        let mut arns = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let response = self
                .client
                .list_clusters()
                .set_next_token(next_token)
                .send()
                .await
                .map_err(classify)?;

            arns.extend(response.cluster_arns().iter().cloned());

            next_token = response.next_token().map(|s| s.to_string());
            if next_token.is_none() {
                break;
            }
        }

        Ok(arns)
    }

    async fn describe_clusters(&self, clusters: &[String]) -> ProviderResult<Vec<ClusterInfo>> {
        let mut described = Vec::with_capacity(clusters.len());

        for batch in clusters.chunks(DESCRIBE_CLUSTERS_BATCH) {
            let response = self
                .client
                .describe_clusters()
                .set_clusters(Some(batch.to_vec()))
                .send()
                .await
                .map_err(classify)?;

            for failure in response.failures() {
                tracing::debug!(
                    arn = failure.arn().unwrap_or(""),
                    reason = failure.reason().unwrap_or(""),
                    "cluster not described"
                );
            }

            described.extend(response.clusters().iter().map(|c| ClusterInfo {
                name: c.cluster_name().map(str::to_string),
                arn: c.cluster_arn().map(str::to_string),
                status: c.status().map(str::to_string),
                running_tasks_count: c.running_tasks_count(),
                pending_tasks_count: c.pending_tasks_count(),
                active_services_count: c.active_services_count(),
            }));
        }

        Ok(described)
    }

    async fn list_services(&self, cluster: &str) -> ProviderResult<Vec<String>> {
        let mut arns = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let response = self
                .client
                .list_services()
                .cluster(cluster)
                .set_next_token(next_token)
                .send()
                .await
                .map_err(classify)?;

            arns.extend(response.service_arns().iter().cloned());

            next_token = response.next_token().map(|s| s.to_string());
            if next_token.is_none() {
                break;
            }
        }

        Ok(arns)
    }

    async fn describe_services(
        &self,
        cluster: &str,
        services: &[String],
    ) -> ProviderResult<Vec<ServiceInfo>> {
        let mut described = Vec::with_capacity(services.len());

        for batch in services.chunks(DESCRIBE_SERVICES_BATCH) {
            let response = self
                .client
                .describe_services()
                .cluster(cluster)
                .set_services(Some(batch.to_vec()))
                .send()
                .await
                .map_err(classify)?;

            described.extend(response.services().iter().map(|s| ServiceInfo {
                name: s.service_name().map(str::to_string),
                arn: s.service_arn().map(str::to_string),
                status: s.status().map(str::to_string),
                desired_count: s.desired_count(),
                running_count: s.running_count(),
                pending_count: s.pending_count(),
                deployment_statuses: s
                    .deployments()
                    .iter()
                    .filter_map(|d| d.status().map(str::to_string))
                    .collect(),
            }));
        }

        Ok(described)
    }
}
