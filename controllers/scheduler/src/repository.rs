//! Repository traits for the resources the reconciler observes and creates.
//!
//! The reconciler only talks to these traits, so tests can substitute an
//! in-memory store. The Kubernetes-backed implementations below list through
//! the API server on every call; nothing is cached between reconciles.
//!
//! Creating a CollectorsGroup relies on the backend to reject a second
//! resource with the same name in a namespace. The gateway factory always uses
//! the same name, so the API server's `AlreadyExists` check is what prevents
//! two racing reconciles from producing two gateways.

use crate::error::StoreError;
use crds::{CollectorsGroup, Destination};
use kube::api::{ListParams, PostParams};
use kube::{Api, Client};

/// Read access to Destination resources.
#[async_trait::async_trait]
pub trait DestinationRepository: Send + Sync {
    /// Returns every Destination currently in `namespace`.
    async fn list_in_namespace(&self, namespace: &str) -> Result<Vec<Destination>, StoreError>;
}

/// Read and create access to CollectorsGroup resources.
#[async_trait::async_trait]
pub trait CollectorsGroupRepository: Send + Sync {
    /// Returns every CollectorsGroup currently in `namespace`, regardless of role.
    async fn list_in_namespace(&self, namespace: &str) -> Result<Vec<CollectorsGroup>, StoreError>;

    /// Persists a new CollectorsGroup. Fails on backend error or name conflict.
    async fn create(&self, group: &CollectorsGroup) -> Result<(), StoreError>;
}

/// Namespace a CollectorsGroup must be created in.
///
/// There is no fallback: a group without a namespace is rejected rather than
/// written somewhere the reconciled namespace will never see it.
pub fn target_namespace(group: &CollectorsGroup) -> Result<&str, StoreError> {
    group
        .metadata
        .namespace
        .as_deref()
        .ok_or_else(|| StoreError::MissingNamespace(group.metadata.name.clone().unwrap_or_default()))
}

/// Destination repository backed by the Kubernetes API.
#[derive(Clone)]
pub struct KubeDestinationRepository {
    client: Client,
}

impl KubeDestinationRepository {
    /// Creates a repository using `client`.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl std::fmt::Debug for KubeDestinationRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeDestinationRepository").finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl DestinationRepository for KubeDestinationRepository {
    async fn list_in_namespace(&self, namespace: &str) -> Result<Vec<Destination>, StoreError> {
        let api: Api<Destination> = Api::namespaced(self.client.clone(), namespace);
        let list = api.list(&ListParams::default()).await?;
        Ok(list.items)
    }
}

/// CollectorsGroup repository backed by the Kubernetes API.
#[derive(Clone)]
pub struct KubeCollectorsGroupRepository {
    client: Client,
}

impl KubeCollectorsGroupRepository {
    /// Creates a repository using `client`.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl std::fmt::Debug for KubeCollectorsGroupRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeCollectorsGroupRepository").finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl CollectorsGroupRepository for KubeCollectorsGroupRepository {
    async fn list_in_namespace(&self, namespace: &str) -> Result<Vec<CollectorsGroup>, StoreError> {
        let api: Api<CollectorsGroup> = Api::namespaced(self.client.clone(), namespace);
        let list = api.list(&ListParams::default()).await?;
        Ok(list.items)
    }

    async fn create(&self, group: &CollectorsGroup) -> Result<(), StoreError> {
        let namespace = target_namespace(group)?;
        let api: Api<CollectorsGroup> = Api::namespaced(self.client.clone(), namespace);
        api.create(&PostParams::default(), group).await?;
        Ok(())
    }
}
