//! Controller-specific error types.
//!
//! `StoreError` is what the repositories return. `ControllerError` is what the
//! reconciler and the wiring around it return; observation and mutation
//! failures keep the repository error untouched as their source so the
//! scheduling layer can inspect it.

use std::time::Duration;
use thiserror::Error;
use kube::Error as KubeError;

/// Errors returned by the Destination and CollectorsGroup repositories.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Kubernetes API error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] KubeError),

    /// Backend could not be reached or answered with a transient failure
    #[error("Backend unavailable: {0}")]
    #[allow(dead_code)] // Constructed by non-Kubernetes stores (in-memory test store)
    Unavailable(String),

    /// A resource with the same identity already exists
    #[error("Conflict: {0}")]
    #[allow(dead_code)] // Constructed by non-Kubernetes stores (in-memory test store)
    Conflict(String),

    /// The resource to create carries no namespace
    #[error("Resource {0} has no namespace")]
    MissingNamespace(String),
}

/// Errors that can occur in the scheduler controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// A list operation failed while observing the namespace
    #[error("Failed to list {resource} in namespace {namespace}: {source}")]
    Observation {
        /// Kind that was being listed
        resource: &'static str,
        /// Namespace being reconciled
        namespace: String,
        /// Error reported by the repository
        #[source]
        source: StoreError,
    },

    /// Creating the gateway CollectorsGroup failed
    #[error("Failed to create gateway in namespace {namespace}: {source}")]
    Mutation {
        /// Namespace being reconciled
        namespace: String,
        /// Error reported by the repository
        #[source]
        source: StoreError,
    },

    /// The reconcile deadline elapsed before the invocation finished
    #[error("Reconcile of namespace {namespace} exceeded its {timeout:?} deadline")]
    DeadlineExceeded {
        /// Namespace being reconciled
        namespace: String,
        /// Deadline that was applied
        timeout: Duration,
    },

    /// A trigger object carried no namespace
    #[error("Resource {0} has no namespace")]
    MissingNamespace(String),

    /// Kubernetes API error outside of reconciliation
    #[error("Kubernetes error: {0}")]
    Kube(#[from] KubeError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Resource watch failed
    #[error("Resource watch failed: {0}")]
    Watch(String),

    /// Metric registration failed
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// Probe server failed
    #[error("Probe server error: {0}")]
    Probe(String),
}

impl ControllerError {
    /// Short label used for the `kind` metric dimension.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Observation { .. } => "observation",
            Self::Mutation { .. } => "mutation",
            Self::DeadlineExceeded { .. } => "deadline",
            _ => "other",
        }
    }
}
