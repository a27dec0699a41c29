//! CollectorsGroup CRD
//!
//! A deployable group of telemetry collectors. The role decides what the
//! group does: `GATEWAY` groups aggregate telemetry for a namespace before
//! export, `DATA_COLLECTION` groups run next to workloads.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// CollectorsGroupSpec defines the desired collector group
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[kube(
    group = "odigos.io",
    version = "v1alpha1",
    kind = "CollectorsGroup",
    namespaced,
    status = "CollectorsGroupStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct CollectorsGroupSpec {
    /// Role of the collectors in this group
    pub role: CollectorsGroupRole,
}

/// Collector group role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CollectorsGroupRole {
    /// Central aggregation point for a namespace
    Gateway,

    /// Per-node data collection
    DataCollection,
}

impl CollectorsGroupRole {
    /// Wire representation of the role
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gateway => "GATEWAY",
            Self::DataCollection => "DATA_COLLECTION",
        }
    }
}

impl std::fmt::Display for CollectorsGroupRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CollectorsGroupStatus defines the observed state of a collector group
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CollectorsGroupStatus {
    /// Whether the collectors in this group are ready
    #[serde(default)]
    pub ready: bool,
}
