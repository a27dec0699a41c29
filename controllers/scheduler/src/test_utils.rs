//! Test utilities for unit testing the reconciler
//!
//! Provides fixture builders and an in-memory store that implements both
//! repository traits. The store enforces the same name uniqueness the API
//! server does, counts calls, and can be told to fail individual operations.

use crate::error::StoreError;
use crate::repository::{target_namespace, CollectorsGroupRepository, DestinationRepository};
use crds::{
    CollectorsGroup, CollectorsGroupRole, CollectorsGroupSpec, Destination, DestinationSpec,
    ObservabilitySignal,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

type Key = (String, String);

/// Helper to create a test Destination
pub fn create_test_destination(name: &str, namespace: &str) -> Destination {
    Destination {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        spec: DestinationSpec {
            destination_type: name.to_string(),
            destination_name: format!("{name}-backend"),
            data: BTreeMap::new(),
            secret_ref: None,
            signals: vec![ObservabilitySignal::Traces],
        },
    }
}

/// Helper to create a test CollectorsGroup with the given role
pub fn create_test_collectors_group(name: &str, namespace: &str, role: CollectorsGroupRole) -> CollectorsGroup {
    CollectorsGroup {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        spec: CollectorsGroupSpec { role },
        status: None,
    }
}

fn key_of(metadata: &ObjectMeta) -> Key {
    (
        metadata.namespace.clone().unwrap_or_default(),
        metadata.name.clone().unwrap_or_default(),
    )
}

#[derive(Default)]
struct Failures {
    destination_list: Option<String>,
    collectors_group_list: Option<String>,
    create: Option<String>,
}

#[derive(Default)]
struct Calls {
    destination_list: usize,
    collectors_group_list: usize,
    create: usize,
}

/// In-memory Destination and CollectorsGroup store
#[derive(Clone, Default)]
pub struct InMemoryStore {
    destinations: Arc<Mutex<BTreeMap<Key, Destination>>>,
    collectors_groups: Arc<Mutex<BTreeMap<Key, CollectorsGroup>>>,
    failures: Arc<Mutex<Failures>>,
    calls: Arc<Mutex<Calls>>,
    hide_groups: Arc<Mutex<bool>>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a Destination (for test setup)
    pub fn add_destination(&self, destination: Destination) {
        let key = key_of(&destination.metadata);
        self.destinations.lock().unwrap().insert(key, destination);
    }

    /// Add a CollectorsGroup (for test setup)
    pub fn add_collectors_group(&self, group: CollectorsGroup) {
        let key = key_of(&group.metadata);
        self.collectors_groups.lock().unwrap().insert(key, group);
    }

    /// Make every Destination list fail with `Unavailable(msg)`
    pub fn fail_destination_list(&self, msg: &str) {
        self.failures.lock().unwrap().destination_list = Some(msg.to_string());
    }

    /// Make every CollectorsGroup list fail with `Unavailable(msg)`
    pub fn fail_collectors_group_list(&self, msg: &str) {
        self.failures.lock().unwrap().collectors_group_list = Some(msg.to_string());
    }

    /// Make every create fail with `Unavailable(msg)`
    pub fn fail_create(&self, msg: &str) {
        self.failures.lock().unwrap().create = Some(msg.to_string());
    }

    /// Make CollectorsGroup lists return nothing, simulating a stale read
    pub fn hide_collectors_groups_from_list(&self, hide: bool) {
        *self.hide_groups.lock().unwrap() = hide;
    }

    /// CollectorsGroups currently stored in `namespace`
    pub fn collectors_groups_in(&self, namespace: &str) -> Vec<CollectorsGroup> {
        self.collectors_groups
            .lock()
            .unwrap()
            .iter()
            .filter(|((ns, _), _)| ns == namespace)
            .map(|(_, group)| group.clone())
            .collect()
    }

    /// Number of Destination list calls made so far
    pub fn destination_list_calls(&self) -> usize {
        self.calls.lock().unwrap().destination_list
    }

    /// Number of CollectorsGroup list calls made so far
    pub fn collectors_group_list_calls(&self) -> usize {
        self.calls.lock().unwrap().collectors_group_list
    }

    /// Number of create calls made so far, successful or not
    pub fn create_calls(&self) -> usize {
        self.calls.lock().unwrap().create
    }
}

#[async_trait::async_trait]
impl DestinationRepository for InMemoryStore {
    async fn list_in_namespace(&self, namespace: &str) -> Result<Vec<Destination>, StoreError> {
        self.calls.lock().unwrap().destination_list += 1;
        if let Some(msg) = &self.failures.lock().unwrap().destination_list {
            return Err(StoreError::Unavailable(msg.clone()));
        }
        Ok(self
            .destinations
            .lock()
            .unwrap()
            .iter()
            .filter(|((ns, _), _)| ns == namespace)
            .map(|(_, d)| d.clone())
            .collect())
    }
}

#[async_trait::async_trait]
impl CollectorsGroupRepository for InMemoryStore {
    async fn list_in_namespace(&self, namespace: &str) -> Result<Vec<CollectorsGroup>, StoreError> {
        self.calls.lock().unwrap().collectors_group_list += 1;
        if let Some(msg) = &self.failures.lock().unwrap().collectors_group_list {
            return Err(StoreError::Unavailable(msg.clone()));
        }
        if *self.hide_groups.lock().unwrap() {
            return Ok(Vec::new());
        }
        Ok(self.collectors_groups_in(namespace))
    }

    async fn create(&self, group: &CollectorsGroup) -> Result<(), StoreError> {
        self.calls.lock().unwrap().create += 1;
        if let Some(msg) = &self.failures.lock().unwrap().create {
            return Err(StoreError::Unavailable(msg.clone()));
        }
        target_namespace(group)?;
        let key = key_of(&group.metadata);
        let mut groups = self.collectors_groups.lock().unwrap();
        if groups.contains_key(&key) {
            return Err(StoreError::Conflict(format!(
                "collectorsgroups \"{}\" already exists in namespace {}",
                key.1, key.0
            )));
        }
        groups.insert(key, group.clone());
        Ok(())
    }
}
