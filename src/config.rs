//! Configuration types for provider and server initialization.

use crate::{GateError, Result};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

/// Region used when neither the login request nor the environment names one.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Validity window requested from the identity service at login.
pub const DEFAULT_SESSION_DURATION: Duration = Duration::from_secs(3600);

/// Provider type identifier.
///
/// Each variant corresponds to a provider implementation enabled via Cargo
/// feature flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderType {
    /// AWS SDK provider (STS, ECS, S3)
    Aws,
    /// In-memory provider for tests and local demos
    Mock,
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Aws => write!(f, "aws"),
            Self::Mock => write!(f, "mock"),
        }
    }
}

impl std::str::FromStr for ProviderType {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aws" => Ok(Self::Aws),
            "mock" => Ok(Self::Mock),
            other => Err(GateError::Config(format!("unknown provider: {}", other))),
        }
    }
}

/// Configuration for the gateway.
///
/// Use the builder pattern for ergonomic configuration:
///
/// ```
/// use awsgate::{Config, ProviderType};
///
/// let config = Config::new(ProviderType::Aws)
///     .with_default_region("eu-west-1")
///     .with_option("endpoint", "http://localhost:4566");
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Provider type
    pub provider: ProviderType,

    /// Address the HTTP server binds to (default: 127.0.0.1:5010)
    pub bind: SocketAddr,

    /// Region applied when a login omits one
    pub default_region: String,

    /// Session token validity requested at login (default: 1 hour)
    pub session_duration: Duration,

    /// Whether the session cookie carries the `Secure` attribute
    pub cookie_secure: bool,

    /// Fallback tracing filter when `RUST_LOG` is unset
    pub log_filter: String,

    /// Provider-specific options
    pub options: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderType::Aws,
            bind: SocketAddr::from(([127, 0, 0, 1], 5010)),
            default_region: DEFAULT_REGION.to_string(),
            session_duration: DEFAULT_SESSION_DURATION,
            cookie_secure: false,
            log_filter: "awsgate=info,tower_http=info".to_string(),
            options: HashMap::new(),
        }
    }
}

impl Config {
    /// Creates a new configuration for the specified provider.
    ///
    /// # Example
    ///
    /// ```
    /// use awsgate::{Config, ProviderType};
    ///
    /// let config = Config::new(ProviderType::Mock);
    /// assert_eq!(config.provider, ProviderType::Mock);
    /// ```
    pub fn new(provider: ProviderType) -> Self {
        Self {
            provider,
            ..Default::default()
        }
    }

    /// Builds a configuration from `AWSGATE_*` environment variables.
    ///
    /// | Variable | Meaning |
    /// |----------|---------|
    /// | `AWSGATE_PROVIDER` | `aws` (default) or `mock` |
    /// | `AWSGATE_BIND` | listen address |
    /// | `AWS_REGION` | default region |
    /// | `AWSGATE_ENDPOINT` | custom endpoint URL (LocalStack) |
    /// | `AWSGATE_SESSION_SECONDS` | session token validity |
    /// | `AWSGATE_COOKIE_SECURE` | `true`/`false` |
    /// | `AWSGATE_LOG` | fallback tracing filter |
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Config`] when a variable is present but invalid.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let provider = match lookup("AWSGATE_PROVIDER") {
            Some(value) => value.parse()?,
            None => ProviderType::Aws,
        };

        let mut config = Self::new(provider);

        if let Some(bind) = lookup("AWSGATE_BIND") {
            config.bind = bind
                .parse()
                .map_err(|e| GateError::Config(format!("AWSGATE_BIND: {}", e)))?;
        }

        if let Some(region) = lookup("AWS_REGION").filter(|r| !r.is_empty()) {
            config.default_region = region;
        }

        if let Some(endpoint) = lookup("AWSGATE_ENDPOINT").filter(|e| !e.is_empty()) {
            config = config.with_option("endpoint", endpoint);
        }

        if let Some(secs) = lookup("AWSGATE_SESSION_SECONDS") {
            let secs: u64 = secs
                .parse()
                .map_err(|e| GateError::Config(format!("AWSGATE_SESSION_SECONDS: {}", e)))?;
            config.session_duration = Duration::from_secs(secs);
        }

        if let Some(secure) = lookup("AWSGATE_COOKIE_SECURE") {
            config.cookie_secure = secure
                .parse()
                .map_err(|e| GateError::Config(format!("AWSGATE_COOKIE_SECURE: {}", e)))?;
        }

        if let Some(filter) = lookup("AWSGATE_LOG") {
            config.log_filter = filter;
        }

        Ok(config)
    }

    /// Sets the listen address.
    pub fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.bind = bind;
        self
    }

    /// Sets the region used when a login request omits one.
    pub fn with_default_region(mut self, region: impl Into<String>) -> Self {
        self.default_region = region.into();
        self
    }

    /// Sets the session token validity requested from the identity service.
    ///
    /// STS accepts 900 seconds to 36 hours for `GetSessionToken`.
    pub fn with_session_duration(mut self, duration: Duration) -> Self {
        self.session_duration = duration;
        self
    }

    /// Marks the session cookie `Secure` (HTTPS only).
    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    /// Adds a provider-specific option.
    ///
    /// **AWS:**
    /// - `endpoint`: Custom endpoint URL for every service (LocalStack testing)
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Gets a provider-specific option value.
    pub fn get_option(&self, key: &str) -> Option<&String> {
        self.options.get(key)
    }
}
