//! Login: exchange long-lived keys for a session record.

use crate::error::ProviderError;
use crate::provider::{Credentials, Provider};
use crate::session::SessionRecord;
use crate::{GateError, Result};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Login request body.
///
/// Every field is optional at the wire level so that a missing key is
/// reported as [`GateError::MissingCredentials`] instead of a parse error.
#[derive(Clone, Default, Deserialize)]
pub struct CredentialInput {
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    pub aws_region: Option<String>,
}

impl std::fmt::Debug for CredentialInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialInput")
            .field("aws_access_key_id", &self.aws_access_key_id)
            .field("aws_region", &self.aws_region)
            .finish_non_exhaustive()
    }
}

impl CredentialInput {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            aws_access_key_id: Some(access_key.into()),
            aws_secret_access_key: Some(secret_key.into()),
            aws_region: None,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.aws_region = Some(region.into());
        self
    }
    /// Reads a login body without failing on unrelated fields.
    ///
    /// Both keys are checked first: a key that is absent, not a string, or
    /// empty is [`GateError::MissingCredentials`] whatever else the body holds.
    /// Only then is `aws_region` looked at; absent or `null` means the default.
    ///
    /// # Errors
    ///
    /// - [`GateError::MissingCredentials`]: either key unusable
    /// - [`GateError::InvalidRequest`]: `aws_region` present but not a string
    pub fn from_json(body: &Value) -> Result<Self> {
        let key = |name: &str| {
            body.get(name)
                .and_then(Value::as_str)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let access_key = key("aws_access_key_id").ok_or(GateError::MissingCredentials)?;
        let secret_key = key("aws_secret_access_key").ok_or(GateError::MissingCredentials)?;

        let aws_region = match body.get("aws_region") {
            None | Some(Value::Null) => None,
            Some(Value::String(region)) => Some(region.clone()),
            Some(other) => {
                return Err(GateError::InvalidRequest(format!(
                    "aws_region must be a string, got {}",
                    other
                )))
            }
        };

        Ok(Self {
            aws_access_key_id: Some(access_key),
            aws_secret_access_key: Some(secret_key),
            aws_region,
        })
    }
}

/// Validates credentials against the identity service and issues sessions.
pub struct Authenticator {
    provider: Arc<dyn Provider>,
    default_region: String,
    session_duration: Duration,
}

impl Authenticator {
    pub fn new(
        provider: Arc<dyn Provider>,
        default_region: impl Into<String>,
        session_duration: Duration,
    ) -> Self {
        Self {
            provider,
            default_region: default_region.into(),
            session_duration,
        }
    }

    /// Performs one login attempt.
    ///
    /// Confirms the keys with a caller-identity call, then requests a session
    /// token valid for the configured duration. Nothing is stored here; the
    /// caller persists the returned record only on success.
    ///
    /// # Errors
    ///
    /// - [`GateError::MissingCredentials`]: empty or absent key
    /// - [`GateError::InvalidCredentials`]: the identity service rejected them
    /// - [`GateError::Unexpected`]: any other failure
    pub async fn login(&self, input: CredentialInput) -> Result<SessionRecord> {
        let access_key = non_empty(input.aws_access_key_id).ok_or(GateError::MissingCredentials)?;
        let secret_key =
            non_empty(input.aws_secret_access_key).ok_or(GateError::MissingCredentials)?;
        let region = non_empty(input.aws_region).unwrap_or_else(|| self.default_region.clone());

        let credentials = Credentials::new(access_key, secret_key);

        let identity = self
            .provider
            .identity(&credentials, &region)
            .await
            .map_err(classify_login_error)?;

        let caller = identity
            .verify_caller()
            .await
            .map_err(classify_login_error)?;

        let issued = identity
            .issue_session_token(self.session_duration)
            .await
            .map_err(classify_login_error)?;

        tracing::info!(
            provider = self.provider.name(),
            account = caller.account.as_deref().unwrap_or("unknown"),
            region = %region,
            expires_at = %issued.expiration,
            "login succeeded"
        );

        Ok(SessionRecord::from_issued(issued, region))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Any answer from the identity service itself means the keys were refused;
/// everything else is an unexpected failure.
fn classify_login_error(err: ProviderError) -> GateError {
    match err {
        ProviderError::Rejected { ref code, .. } => {
            tracing::warn!(code = %code, "identity service rejected credentials");
            GateError::InvalidCredentials
        }
        ProviderError::NotFound(_) => GateError::InvalidCredentials,
        ProviderError::Transport(message) => GateError::Unexpected(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mock::MockProvider;
    use chrono::Utc;

    fn authenticator(provider: MockProvider) -> Authenticator {
        Authenticator::new(Arc::new(provider), "us-east-1", Duration::from_secs(3600))
    }

    async fn provider() -> MockProvider {
        let provider = MockProvider::new();
        provider.accept_credentials("AKIAVALID", "valid-secret").await;
        provider
    }

    #[tokio::test]
    async fn test_login_success() {
        let auth = authenticator(provider().await);
        let before = Utc::now();

        let record = auth
            .login(CredentialInput::new("AKIAVALID", "valid-secret"))
            .await
            .unwrap();

        assert_eq!(record.region, "us-east-1");
        assert!(!record.session_token.is_empty());
        assert_ne!(record.secret_access_key, "valid-secret");

        let expiry = record.expiry().unwrap().unwrap();
        let window = (expiry - before).num_seconds();
        assert!((3599..=3601).contains(&window), "window was {}", window);
    }

    #[tokio::test]
    async fn test_login_uses_requested_region() {
        let auth = authenticator(provider().await);
        let record = auth
            .login(CredentialInput::new("AKIAVALID", "valid-secret").with_region("ap-northeast-1"))
            .await
            .unwrap();
        assert_eq!(record.region, "ap-northeast-1");
    }

    #[tokio::test]
    async fn test_login_empty_region_uses_default() {
        let auth = authenticator(provider().await);
        let record = auth
            .login(CredentialInput::new("AKIAVALID", "valid-secret").with_region(""))
            .await
            .unwrap();
        assert_eq!(record.region, "us-east-1");
    }

    #[tokio::test]
    async fn test_login_missing_credentials() {
        let auth = authenticator(provider().await);

        let cases = [
            CredentialInput::default(),
            CredentialInput {
                aws_access_key_id: Some("AKIAVALID".into()),
                ..Default::default()
            },
            CredentialInput {
                aws_secret_access_key: Some("valid-secret".into()),
                aws_region: Some("us-west-2".into()),
                ..Default::default()
            },
            CredentialInput::new("", "valid-secret"),
            CredentialInput::new("AKIAVALID", ""),
        ];

        for input in cases {
            let result = auth.login(input).await;
            assert!(matches!(result, Err(GateError::MissingCredentials)));
        }
    }

    #[tokio::test]
    async fn test_login_whitespace_key_is_sent_to_identity_service() {
        let auth = authenticator(provider().await);
        let result = auth.login(CredentialInput::new("AKIAVALID", "   ")).await;
        assert!(matches!(result, Err(GateError::InvalidCredentials)));
    }

    #[test]
    fn test_from_json_checks_keys_before_region() {
        let cases = [
            serde_json::json!({"aws_secret_access_key": "x", "aws_region": 5}),
            serde_json::json!({"aws_access_key_id": 7, "aws_secret_access_key": "x"}),
            serde_json::json!({"aws_access_key_id": "AKIAVALID", "aws_secret_access_key": null}),
            serde_json::json!([1, 2, 3]),
            serde_json::json!("AKIAVALID"),
        ];

        for body in cases {
            let result = CredentialInput::from_json(&body);
            assert!(
                matches!(result, Err(GateError::MissingCredentials)),
                "body {} gave {:?}",
                body,
                result
            );
        }
    }

    #[test]
    fn test_from_json_region() {
        let input = CredentialInput::from_json(&serde_json::json!({
            "aws_access_key_id": "AKIAVALID",
            "aws_secret_access_key": "valid-secret",
            "aws_region": "eu-north-1",
            "extra": {"ignored": true},
        }))
        .unwrap();
        assert_eq!(input.aws_region.as_deref(), Some("eu-north-1"));

        let input = CredentialInput::from_json(&serde_json::json!({
            "aws_access_key_id": "AKIAVALID",
            "aws_secret_access_key": "valid-secret",
            "aws_region": null,
        }))
        .unwrap();
        assert!(input.aws_region.is_none());

        let result = CredentialInput::from_json(&serde_json::json!({
            "aws_access_key_id": "AKIAVALID",
            "aws_secret_access_key": "valid-secret",
            "aws_region": 5,
        }));
        assert!(matches!(result, Err(GateError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_login_rejected_credentials() {
        let auth = authenticator(provider().await);
        let result = auth
            .login(CredentialInput::new("AKIAVALID", "wrong-secret"))
            .await;
        assert!(matches!(result, Err(GateError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_transport_failure_is_unexpected() {
        let mut provider = provider().await;
        provider.identity_error = Some(ProviderError::Transport("dns failure".into()));
        let auth = authenticator(provider);

        let result = auth
            .login(CredentialInput::new("AKIAVALID", "valid-secret"))
            .await;

        match result {
            Err(GateError::Unexpected(message)) => assert!(message.contains("dns failure")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_login_token_issuance_rejected() {
        let mut provider = provider().await;
        provider.issue_error = Some(ProviderError::rejected("AccessDenied", "mfa required"));
        let auth = authenticator(provider);

        let result = auth
            .login(CredentialInput::new("AKIAVALID", "valid-secret"))
            .await;
        assert!(matches!(result, Err(GateError::InvalidCredentials)));
    }
}
