//! Destination CRD
//!
//! Declares where telemetry should be exported. The scheduler only reads
//! destinations; their configuration is opaque to it.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// DestinationSpec defines the desired export target
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[kube(
    group = "odigos.io",
    version = "v1alpha1",
    kind = "Destination",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct DestinationSpec {
    /// Backend type (e.g., "jaeger", "prometheus", "otlp")
    #[serde(rename = "type")]
    pub destination_type: String,

    /// Human-readable destination name
    pub destination_name: String,

    /// Backend-specific settings
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,

    /// Secret holding backend credentials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_ref: Option<SecretReference>,

    /// Signals exported to this destination
    #[serde(default)]
    pub signals: Vec<ObservabilitySignal>,
}

/// Reference to a Secret in the destination's namespace
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SecretReference {
    /// Secret name
    pub name: String,
}

/// Telemetry signal kinds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObservabilitySignal {
    /// Distributed traces
    Traces,

    /// Metrics
    Metrics,

    /// Logs
    Logs,
}
