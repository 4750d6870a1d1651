//! JSON projections returned by the inventory endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary of one ECS cluster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClusterSummary {
    pub cluster_name: Option<String>,
    pub cluster_arn: Option<String>,
    pub status: Option<String>,
    pub running_tasks_count: i32,
    pub pending_tasks_count: i32,
    pub active_services_count: i32,
}

/// Summary of one ECS service inside a cluster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceSummary {
    pub service_name: Option<String>,
    pub service_arn: Option<String>,
    pub status: Option<String>,
    pub desired_count: i32,
    pub running_count: i32,
    pub pending_count: i32,
    /// `PRIMARY` when a primary deployment exists, `UNKNOWN` otherwise
    pub deployment_status: DeploymentStatus,
}

/// Rolled-up deployment state of a service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeploymentStatus {
    Primary,
    Unknown,
}

impl std::fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primary => write!(f, "PRIMARY"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Metadata and usage totals for one S3 bucket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BucketDetail {
    pub name: String,

    /// Always `YYYY-MM-DDTHH:MM:SSZ` or null
    #[serde(with = "zulu_seconds")]
    pub creation_date: Option<DateTime<Utc>>,

    pub region: String,
    pub object_count: u64,
    pub total_size_bytes: u64,
    pub versioning_enabled: bool,
    pub public_access_blocked: bool,
}

/// Second-precision UTC timestamps with a literal `Z` suffix.
pub mod zulu_seconds {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_str(&ts.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| {
            NaiveDateTime::parse_from_str(&s, FORMAT)
                .map(|naive| naive.and_utc())
                .map_err(serde::de::Error::custom)
        })
        .transpose()
    }
}
