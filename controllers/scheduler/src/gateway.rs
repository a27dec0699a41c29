//! Gateway CollectorsGroup construction.

use crds::{CollectorsGroup, CollectorsGroupRole, CollectorsGroupSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;

/// Name given to every gateway this controller creates. Fixed per namespace
/// so the API server rejects a duplicate create.
pub const GATEWAY_NAME: &str = "odigos-gateway";

/// Value of the `app.kubernetes.io/managed-by` label on created gateways.
pub const MANAGED_BY: &str = "odigos-scheduler";

/// Builds gateway CollectorsGroup values. Implementations must be pure.
pub trait GatewayFactory: Send + Sync {
    /// Returns a fully formed gateway-role CollectorsGroup for `namespace`.
    fn new_gateway(&self, namespace: &str) -> CollectorsGroup;
}

/// Factory producing the standard `odigos-gateway` group.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultGatewayFactory;

impl GatewayFactory for DefaultGatewayFactory {
    fn new_gateway(&self, namespace: &str) -> CollectorsGroup {
        let labels = BTreeMap::from([(
            "app.kubernetes.io/managed-by".to_string(),
            MANAGED_BY.to_string(),
        )]);

        CollectorsGroup {
            metadata: ObjectMeta {
                name: Some(GATEWAY_NAME.to_string()),
                namespace: Some(namespace.to_string()),
                labels: Some(labels),
                ..Default::default()
            },
            spec: CollectorsGroupSpec { role: CollectorsGroupRole::Gateway },
            status: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_gateway_shape() {
        let group = DefaultGatewayFactory.new_gateway("ns1");

        assert_eq!(group.metadata.name.as_deref(), Some(GATEWAY_NAME));
        assert_eq!(group.metadata.namespace.as_deref(), Some("ns1"));
        assert_eq!(group.spec.role, CollectorsGroupRole::Gateway);
        assert!(group.status.is_none());
        let labels = group.metadata.labels.unwrap_or_default();
        assert_eq!(labels.get("app.kubernetes.io/managed-by").map(String::as_str), Some(MANAGED_BY));
    }

    #[test]
    fn test_new_gateway_is_deterministic() {
        let factory = DefaultGatewayFactory;
        let first = serde_json::to_value(factory.new_gateway("ns2")).unwrap();
        let second = serde_json::to_value(factory.new_gateway("ns2")).unwrap();
        assert_eq!(first, second);
        assert_eq!(first["apiVersion"], "odigos.io/v1alpha1");
        assert_eq!(first["kind"], "CollectorsGroup");
    }
}
