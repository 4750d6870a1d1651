//! STS identity client.

use super::{classify, to_chrono};
use crate::error::ProviderError;
use crate::provider::{CallerIdentity, IdentityService, IssuedCredentials, ProviderResult};
use async_trait::async_trait;
use aws_sdk_sts::Client;
use std::time::Duration;

/// STS client scoped to the caller's long-lived keys.
pub struct AwsIdentity {
    client: Client,
}

impl AwsIdentity {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IdentityService for AwsIdentity {
    async fn verify_caller(&self) -> ProviderResult<CallerIdentity> {
        let response = self
            .client
            .get_caller_identity()
            .send()
            .await
            .map_err(classify)?;

        Ok(CallerIdentity {
            account: response.account().map(str::to_string),
            arn: response.arn().map(str::to_string),
            user_id: response.user_id().map(str::to_string),
        })
    }

    async fn issue_session_token(&self, duration: Duration) -> ProviderResult<IssuedCredentials> {
        let seconds = i32::try_from(duration.as_secs())
            .map_err(|_| ProviderError::Transport("session duration out of range".to_string()))?;

        let response = self
            .client
            .get_session_token()
            .duration_seconds(seconds)
            .send()
            .await
            .map_err(classify)?;

        let credentials = response.credentials().ok_or_else(|| {
            ProviderError::Transport("GetSessionToken returned no credentials".to_string())
        })?;

        let expiration = to_chrono(credentials.expiration()).ok_or_else(|| {
            ProviderError::Transport("GetSessionToken returned an invalid expiration".to_string())
        })?;

        Ok(IssuedCredentials {
            access_key_id: credentials.access_key_id().to_string(),
            secret_access_key: credentials.secret_access_key().to_string(),
            session_token: credentials.session_token().to_string(),
            expiration,
        })
    }
}
