//! Error types for awsgate operations.
//!
//! Two layers exist. [`ProviderError`] is produced at the provider boundary and
//! classifies whatever the cloud SDK returned. [`GateError`] is the taxonomy the
//! HTTP surface speaks; its `Display` output is the `error` message sent to the
//! caller.

use thiserror::Error;

/// Result type alias using [`GateError`].
pub type Result<T> = std::result::Result<T, GateError>;

/// Classified failure of a single provider call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The addressed resource does not exist.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// The provider answered with a service-level error (bad credentials,
    /// access denied, throttling, ...).
    #[error("{code}: {message}")]
    Rejected {
        /// Provider error code, e.g. `InvalidClientTokenId`
        code: String,
        /// Provider error message
        message: String,
    },

    /// The call never produced a service response (network, timeout,
    /// malformed response, client construction).
    #[error("transport error: {0}")]
    Transport(String),
}

impl ProviderError {
    /// Creates a rejection with the given provider error code.
    pub fn rejected(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Returns true when the provider reported the resource as absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Errors surfaced by the gateway.
///
/// Each variant maps onto exactly one HTTP status; see `api::error`.
#[derive(Debug, Error)]
pub enum GateError {
    /// Login request lacked the access key or the secret key.
    #[error("Credentials are missing")]
    MissingCredentials,

    /// The identity provider rejected the supplied credentials.
    #[error("Invalid AWS credentials")]
    InvalidCredentials,

    /// Login failed for a reason other than rejected credentials.
    #[error("Unexpected error: {0}")]
    Unexpected(String),

    /// No session record exists for this client.
    #[error("Please login before making API requests.")]
    Unauthenticated,

    /// The stored session token is past its expiration.
    #[error("Session has expired. Please log in again.")]
    SessionExpired,

    /// The stored expiration could not be parsed.
    #[error("Invalid expiration time format. Please check the format.")]
    MalformedSessionState(String),

    /// A cluster, service or bucket lookup came back empty.
    ///
    /// `collection` names a JSON key that is echoed as an empty array in the
    /// error body, so listing clients can keep reading the same field.
    #[error("{message}")]
    NotFound {
        /// Human-readable message
        message: String,
        /// Collection key to return as `[]`, if any
        collection: Option<&'static str>,
    },

    /// Request body or path parameter is malformed.
    #[error("{0}")]
    InvalidRequest(String),

    /// A provider call failed and there is no more specific classification.
    #[error("{context}: {source}")]
    Upstream {
        /// What the handler was doing
        context: String,
        /// Classified provider failure
        #[source]
        source: ProviderError,
    },

    /// Cookie-backed session store failed.
    #[error("session store error: {0}")]
    SessionStore(String),

    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),
}

impl GateError {
    /// Wraps a provider failure with the operation that was being attempted.
    ///
    /// # Example
    ///
    /// ```
    /// use awsgate::{GateError, ProviderError};
    ///
    /// let err = GateError::upstream(
    ///     "Failed to fetch clusters",
    ///     ProviderError::Transport("connection reset".to_string()),
    /// );
    ///
    /// assert_eq!(
    ///     err.to_string(),
    ///     "Failed to fetch clusters: transport error: connection reset"
    /// );
    /// ```
    pub fn upstream(context: impl Into<String>, source: ProviderError) -> Self {
        Self::Upstream {
            context: context.into(),
            source,
        }
    }

    /// A plain not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            collection: None,
        }
    }

    /// A not-found error for a listing that came back empty.
    pub fn empty_listing(message: impl Into<String>, collection: &'static str) -> Self {
        Self::NotFound {
            message: message.into(),
            collection: Some(collection),
        }
    }
}

impl From<tower_sessions::session::Error> for GateError {
    fn from(err: tower_sessions::session::Error) -> Self {
        Self::SessionStore(err.to_string())
    }
}
