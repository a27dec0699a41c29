//! Odigos CRD Definitions
//!
//! Kubernetes Custom Resource Definitions consumed and produced by the
//! scheduler controller.

pub mod collectors_group;
pub mod destination;

pub use collectors_group::*;
pub use destination::*;

/// API group shared by every resource in this crate
pub const API_GROUP: &str = "odigos.io";

/// API version shared by every resource in this crate
pub const API_VERSION: &str = "v1alpha1";
