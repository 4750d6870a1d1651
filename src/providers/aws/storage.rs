//! S3 client.

use super::{classify, to_chrono};
use crate::config::DEFAULT_REGION;
use crate::error::ProviderError;
use crate::provider::{BucketInfo, ObjectPage, ProviderResult, StorageService};
use async_trait::async_trait;
use aws_sdk_s3::types::BucketVersioningStatus;
use aws_sdk_s3::Client;

/// S3 client scoped to a session.
pub struct AwsStorage {
    client: Client,
}

impl AwsStorage {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StorageService for AwsStorage {
    async fn list_buckets(&self) -> ProviderResult<Vec<BucketInfo>> {
        let response = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(classify)?;

        Ok(response
            .buckets()
            .iter()
            .filter_map(|b| {
                let name = b.name()?;
                Some(BucketInfo {
                    name: name.to_string(),
                    creation_date: b.creation_date().and_then(to_chrono),
                })
            })
            .collect())
    }

    async fn bucket_region(&self, bucket: &str) -> ProviderResult<String> {
        let response = self
            .client
            .get_bucket_location()
            .bucket(bucket)
            .send()
            .await
            .map_err(classify)?;

        // An empty location constraint is how S3 spells us-east-1
        Ok(response
            .location_constraint()
            .map(|c| c.as_str())
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_REGION)
            .to_string())
    }

    async fn versioning_enabled(&self, bucket: &str) -> ProviderResult<bool> {
        let response = self
            .client
            .get_bucket_versioning()
            .bucket(bucket)
            .send()
            .await
            .map_err(classify)?;

        Ok(response.status() == Some(&BucketVersioningStatus::Enabled))
    }

    async fn public_access_blocked(&self, bucket: &str) -> ProviderResult<bool> {
        match self
            .client
            .get_public_access_block()
            .bucket(bucket)
            .send()
            .await
            .map_err(classify)
        {
            Ok(response) => Ok(response.public_access_block_configuration().is_some()),
            Err(ProviderError::Rejected { code, .. })
                if code == "NoSuchPublicAccessBlockConfiguration" =>
            {
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    async fn list_objects_page(
        &self,
        bucket: &str,
        token: Option<String>,
    ) -> ProviderResult<ObjectPage> {
        let response = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .set_continuation_token(token)
            .send()
            .await
            .map_err(classify)?;

        let sizes = response
            .contents()
            .iter()
            .map(|o| o.size().unwrap_or_default().max(0) as u64)
            .collect();

        let next_token = if response.is_truncated().unwrap_or(false) {
            response.next_continuation_token().map(str::to_string)
        } else {
            None
        };

        Ok(ObjectPage { sizes, next_token })
    }
}
