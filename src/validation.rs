//! Path-parameter validation.
//!
//! Names are checked before any provider call so that a malformed request is
//! a client error, not an upstream failure.

use crate::{GateError, Result};

/// Maximum length of an ECS cluster name or ARN.
const MAX_CLUSTER_LENGTH: usize = 255;

/// Legacy us-east-1 bucket names may be up to 255 bytes.
const MAX_BUCKET_LENGTH: usize = 255;

fn invalid(kind: &str, reason: impl std::fmt::Display) -> GateError {
    GateError::InvalidRequest(format!("invalid {} name: {}", kind, reason))
}

/// Validates an ECS cluster name or cluster ARN.
///
/// Names are letters, digits, hyphens and underscores. ARNs
/// (`arn:...:cluster/<name>`) are accepted as well.
///
/// # Example
///
/// ```
/// use awsgate::validation::validate_cluster_name;
///
/// assert!(validate_cluster_name("prod-cluster_01").is_ok());
/// assert!(validate_cluster_name("arn:aws:ecs:us-east-1:123456789012:cluster/prod").is_ok());
///
/// assert!(validate_cluster_name("").is_err());
/// assert!(validate_cluster_name("prod cluster").is_err());
/// ```
pub fn validate_cluster_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(invalid("cluster", "name cannot be empty"));
    }

    if name.len() > MAX_CLUSTER_LENGTH {
        return Err(invalid(
            "cluster",
            format!("exceeds maximum length of {} characters", MAX_CLUSTER_LENGTH),
        ));
    }

    let allowed = |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_';

    if let Some(rest) = name.strip_prefix("arn:") {
        let Some((_, cluster)) = rest.split_once(":cluster/") else {
            return Err(invalid("cluster", "ARN does not name a cluster"));
        };
        if cluster.is_empty() || !cluster.chars().all(allowed) {
            return Err(invalid("cluster", "ARN contains an invalid cluster name"));
        }
        return Ok(());
    }

    if !name.chars().all(allowed) {
        return Err(invalid(
            "cluster",
            "only letters, digits, hyphens and underscores are allowed",
        ));
    }

    Ok(())
}

/// Validates an S3 bucket name.
///
/// Only rejects what can never address a bucket: empty names, names over 255
/// bytes, path separators and control characters. Legacy us-east-1 buckets
/// may carry uppercase letters and underscores, so the current naming rules
/// are left to the provider, which answers `NoSuchBucket` for anything absent.
///
/// # Example
///
/// ```
/// use awsgate::validation::validate_bucket_name;
///
/// assert!(validate_bucket_name("my-logs.2024").is_ok());
/// assert!(validate_bucket_name("Legacy_Bucket").is_ok());
///
/// assert!(validate_bucket_name("").is_err());
/// assert!(validate_bucket_name("logs/2024").is_err());
/// ```
pub fn validate_bucket_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(invalid("bucket", "name cannot be empty"));
    }

    if name.len() > MAX_BUCKET_LENGTH {
        return Err(invalid(
            "bucket",
            format!("exceeds maximum length of {} bytes", MAX_BUCKET_LENGTH),
        ));
    }

    if name.contains('/') {
        return Err(invalid("bucket", "must not contain '/'"));
    }

    if name.chars().any(char::is_control) {
        return Err(invalid("bucket", "must not contain control characters"));
    }

    Ok(())
}
