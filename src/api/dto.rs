//! Response bodies.

use crate::model::{BucketDetail, ClusterSummary, ServiceSummary};
use serde::{Deserialize, Serialize};

/// Body of a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    /// RFC 3339 UTC timestamp after which the session must be renewed
    pub expires_at: Option<String>,
}

/// Generic acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClustersResponse {
    pub clusters: Vec<ClusterSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicesResponse {
    pub services: Vec<ServiceSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketsResponse {
    pub buckets: Vec<BucketDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
