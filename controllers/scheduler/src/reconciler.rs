//! Gateway reconciliation.
//!
//! For a namespace, this module makes sure that if any Destination exists
//! then at least one CollectorsGroup exists too, creating a gateway group when
//! none is present. Every call lists both kinds again and decides from
//! scratch; nothing is remembered between calls, so missed or duplicated
//! triggers are harmless.
//!
//! Any CollectorsGroup satisfies the check, whatever its role. A namespace
//! holding only `DATA_COLLECTION` groups is left without a gateway.
//!
//! The reconciler never retries. Failures are returned to the caller with the
//! repository error as their source, and the caller decides when to try again.

use crate::error::ControllerError;
use crate::gateway::GatewayFactory;
use crate::repository::{CollectorsGroupRepository, DestinationRepository};
use tracing::{debug, error, info};

/// Result of a successful reconcile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// No Destinations in the namespace; nothing to do
    NoDestinations,
    /// Destinations exist and at least one CollectorsGroup already exists
    CollectorsGroupPresent,
    /// A gateway CollectorsGroup was created
    GatewayCreated {
        /// Name of the created group
        name: String,
    },
}

impl ReconcileOutcome {
    /// Whether the reconcile left the cluster untouched.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        !matches!(self, Self::GatewayCreated { .. })
    }

    /// Short label used for the `outcome` metric dimension.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::NoDestinations => "no_destinations",
            Self::CollectorsGroupPresent => "collectors_group_present",
            Self::GatewayCreated { .. } => "gateway_created",
        }
    }
}

/// Ensures a gateway CollectorsGroup exists wherever Destinations exist.
pub struct Reconciler {
    destinations: Box<dyn DestinationRepository>,
    collectors_groups: Box<dyn CollectorsGroupRepository>,
    gateway_factory: Box<dyn GatewayFactory>,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler").finish_non_exhaustive()
    }
}

impl Reconciler {
    /// Creates a new reconciler instance.
    pub fn new(
        destinations: Box<dyn DestinationRepository>,
        collectors_groups: Box<dyn CollectorsGroupRepository>,
        gateway_factory: Box<dyn GatewayFactory>,
    ) -> Self {
        Self {
            destinations,
            collectors_groups,
            gateway_factory,
        }
    }

    /// Reconciles one namespace.
    ///
    /// This method:
    /// 1. Lists Destinations; returns if there are none
    /// 2. Lists CollectorsGroups; returns if there is at least one
    /// 3. Creates one gateway CollectorsGroup
    ///
    /// Nothing is written before step 3, so dropping the future earlier leaves
    /// the namespace untouched.
    pub async fn reconcile(&self, namespace: &str) -> Result<ReconcileOutcome, ControllerError> {
        let destinations = match self.destinations.list_in_namespace(namespace).await {
            Ok(d) => d,
            Err(e) => {
                error!(namespace, error = %e, "Failed to list destinations");
                return Err(ControllerError::Observation {
                    resource: "Destination",
                    namespace: namespace.to_string(),
                    source: e,
                });
            }
        };

        if destinations.is_empty() {
            debug!(namespace, "No destinations, nothing to do");
            return Ok(ReconcileOutcome::NoDestinations);
        }

        let groups = match self.collectors_groups.list_in_namespace(namespace).await {
            Ok(g) => g,
            Err(e) => {
                error!(namespace, error = %e, "Failed to list collectors groups");
                return Err(ControllerError::Observation {
                    resource: "CollectorsGroup",
                    namespace: namespace.to_string(),
                    source: e,
                });
            }
        };

        if !groups.is_empty() {
            debug!(
                namespace,
                destinations = destinations.len(),
                collectors_groups = groups.len(),
                "Collectors group already present"
            );
            return Ok(ReconcileOutcome::CollectorsGroupPresent);
        }

        info!(
            namespace,
            destinations = destinations.len(),
            "Destinations found, but no collectors groups found, creating gateway"
        );
        let gateway = self.gateway_factory.new_gateway(namespace);
        let name = gateway.metadata.name.clone().unwrap_or_default();

        if let Err(e) = self.collectors_groups.create(&gateway).await {
            error!(namespace, gateway = %name, error = %e, "Failed to create gateway");
            return Err(ControllerError::Mutation {
                namespace: namespace.to_string(),
                source: e,
            });
        }

        info!(namespace, gateway = %name, "Created gateway collectors group");
        Ok(ReconcileOutcome::GatewayCreated { name })
    }
}
