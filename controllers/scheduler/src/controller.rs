//! Main controller implementation.
//!
//! This module contains the `Controller` struct that wires the reconciler to
//! the Kubernetes API, the watchers and the probe server.

use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::gateway::DefaultGatewayFactory;
use crate::metrics::ReconcileMetrics;
use crate::probes::{self, ProbeState};
use crate::reconciler::Reconciler;
use crate::repository::{KubeCollectorsGroupRepository, KubeDestinationRepository};
use crate::watcher::{self, WatchedKinds};
use crds::{CollectorsGroup, Destination};
use kube::{Api, Client};
use std::sync::Arc;
use tracing::info;

/// Main controller for gateway scheduling.
#[derive(Debug)]
pub struct Controller {
    config: ControllerConfig,
    reconciler: Arc<Reconciler>,
    kinds: WatchedKinds,
    metrics: ReconcileMetrics,
    probes: ProbeState,
}

impl Controller {
    /// Creates a new controller instance.
    pub async fn new(config: ControllerConfig) -> Result<Self, ControllerError> {
        info!("Initializing Scheduler Controller");

        let kube_client = Client::try_default().await?;

        let kinds = match config.watch_namespace.as_deref() {
            Some(ns) => WatchedKinds {
                destinations: Api::namespaced(kube_client.clone(), ns),
                collectors_groups: Api::namespaced(kube_client.clone(), ns),
            },
            None => WatchedKinds {
                destinations: Api::<Destination>::all(kube_client.clone()),
                collectors_groups: Api::<CollectorsGroup>::all(kube_client.clone()),
            },
        };

        let reconciler = Reconciler::new(
            Box::new(KubeDestinationRepository::new(kube_client.clone())),
            Box::new(KubeCollectorsGroupRepository::new(kube_client)),
            Box::new(DefaultGatewayFactory),
        );

        let metrics = ReconcileMetrics::new()?;
        let probes = ProbeState::new(metrics.clone());

        Ok(Self {
            config,
            reconciler: Arc::new(reconciler),
            kinds,
            metrics,
            probes,
        })
    }

    /// Runs the controller until shutdown.
    pub async fn run(self) -> Result<(), ControllerError> {
        info!("Scheduler Controller running");

        let mut probe_server = tokio::spawn(probes::serve(self.config.probe_addr, self.probes.clone()));

        let watchers = watcher::register(
            self.reconciler,
            self.kinds,
            &self.config,
            self.metrics,
            self.probes,
        );

        // Watchers return on SIGINT/SIGTERM; the probe server should never exit
        tokio::select! {
            result = watchers => {
                probe_server.abort();
                result?;
            }
            result = &mut probe_server => {
                result.map_err(|e| ControllerError::Watch(format!("Probe server panicked: {e}")))??;
            }
        }

        info!("Scheduler Controller stopped");
        Ok(())
    }
}
