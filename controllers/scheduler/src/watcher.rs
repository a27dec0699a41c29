//! Kubernetes resource watchers.
//!
//! Registers the reconciler with `kube_runtime::Controller`. Destinations are
//! the primary kind; CollectorsGroup events are mapped back to a Destination
//! in the same namespace, so a change to either kind reconciles that
//! namespace.
//!
//! The runtime queues objects, not namespaces. Each namespace is reconciled
//! through a single representative Destination (the first by name); triggers
//! for its other Destinations are acknowledged without touching the
//! namespace. That keeps one reconcile and one retry schedule per namespace.
//!
//! This layer owns everything temporal: the per-invocation deadline, the
//! periodic resync and the retry backoff after failures.

use crate::backoff::NamespaceBackoff;
use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::metrics::ReconcileMetrics;
use crate::probes::ProbeState;
use crate::reconciler::{ReconcileOutcome, Reconciler};
use crds::{CollectorsGroup, Destination};
use futures::StreamExt;
use kube::{Api, ResourceExt};
use kube_runtime::controller::{Action, Config as RuntimeConfig};
use kube_runtime::reflector::{ObjectRef, Store};
use kube_runtime::{watcher, Controller};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Resource kinds whose changes trigger a reconcile.
#[derive(Clone)]
pub struct WatchedKinds {
    /// Primary kind
    pub destinations: Api<Destination>,
    /// Secondary kind, mapped to Destinations in the same namespace
    pub collectors_groups: Api<CollectorsGroup>,
}

impl std::fmt::Debug for WatchedKinds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchedKinds").finish_non_exhaustive()
    }
}

/// Context handed to every reconcile and error-policy call.
pub struct WatchContext {
    reconciler: Arc<Reconciler>,
    metrics: ReconcileMetrics,
    destinations: Store<Destination>,
    backoff: NamespaceBackoff,
    reconcile_timeout: Duration,
    resync_interval: Duration,
}

impl std::fmt::Debug for WatchContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchContext")
            .field("reconcile_timeout", &self.reconcile_timeout)
            .field("resync_interval", &self.resync_interval)
            .finish_non_exhaustive()
    }
}

impl WatchContext {
    /// Creates the context from the reconciler, the Destination cache and
    /// configuration.
    pub fn new(
        reconciler: Arc<Reconciler>,
        metrics: ReconcileMetrics,
        destinations: Store<Destination>,
        config: &ControllerConfig,
    ) -> Self {
        // A failing namespace is retried at least every `backoff_max` plus one reconcile.
        let retention = config
            .backoff_max
            .saturating_mul(2)
            .saturating_add(config.reconcile_timeout);

        Self {
            reconciler,
            metrics,
            destinations,
            backoff: NamespaceBackoff::new(config.backoff_min, config.backoff_max, retention),
            reconcile_timeout: config.reconcile_timeout,
            resync_interval: config.resync_interval,
        }
    }

    fn requeue_after_success(&self) -> Action {
        if self.resync_interval.is_zero() {
            Action::await_change()
        } else {
            Action::requeue(self.resync_interval)
        }
    }
}

/// Runs `reconciler` for `namespace`, giving up after `timeout`.
///
/// An elapsed deadline drops the in-flight call. If that call was the create,
/// it may or may not have been applied; the next reconcile observes the result.
pub async fn reconcile_with_deadline(
    reconciler: &Reconciler,
    namespace: &str,
    timeout: Duration,
) -> Result<ReconcileOutcome, ControllerError> {
    match tokio::time::timeout(timeout, reconciler.reconcile(namespace)).await {
        Ok(result) => result,
        Err(_) => {
            warn!(namespace, ?timeout, "Reconcile deadline exceeded");
            Err(ControllerError::DeadlineExceeded {
                namespace: namespace.to_string(),
                timeout,
            })
        }
    }
}

/// The Destination that stands for `namespace`: the first one by name.
pub fn namespace_representative(
    destinations: &[Arc<Destination>],
    namespace: Option<&str>,
) -> Option<ObjectRef<Destination>> {
    destinations
        .iter()
        .filter(|d| d.metadata.namespace.as_deref() == namespace)
        .min_by(|a, b| a.metadata.name.cmp(&b.metadata.name))
        .map(|d| ObjectRef::from_obj(d.as_ref()))
}

async fn reconcile_destination(
    destination: Arc<Destination>,
    ctx: Arc<WatchContext>,
) -> Result<Action, ControllerError> {
    let namespace = destination
        .namespace()
        .ok_or_else(|| ControllerError::MissingNamespace(destination.name_any()))?;

    let trigger = destination.name_any();
    let representative = namespace_representative(&ctx.destinations.state(), Some(&namespace));
    if let Some(representative) = representative.filter(|r| r.name != trigger) {
        debug!(
            namespace = %namespace,
            trigger = %trigger,
            representative = %representative.name,
            "Namespace is reconciled through another destination"
        );
        return Ok(ctx.requeue_after_success());
    }

    debug!(namespace = %namespace, trigger = %trigger, "Reconciling namespace");
    let started = Instant::now();
    let result = reconcile_with_deadline(&ctx.reconciler, &namespace, ctx.reconcile_timeout).await;
    ctx.metrics.observe(&result, started.elapsed());

    let outcome = result?;
    if !outcome.is_noop() {
        info!(namespace = %namespace, outcome = outcome.label(), "Namespace converged");
    }
    ctx.backoff.reset(&namespace);
    Ok(ctx.requeue_after_success())
}

fn error_policy(destination: Arc<Destination>, error: &ControllerError, ctx: Arc<WatchContext>) -> Action {
    let namespace = destination.namespace().unwrap_or_default();
    let delay = ctx.backoff.next_for(&namespace);
    warn!(
        namespace = %namespace,
        error = %error,
        retry_in = ?delay,
        "Reconciliation failed, requeueing"
    );
    Action::requeue(delay)
}

/// Registers the reconciler for the watched kinds and runs until shutdown.
///
/// Returns once SIGINT or SIGTERM is received and in-flight reconciles
/// have finished.
pub async fn register(
    reconciler: Arc<Reconciler>,
    kinds: WatchedKinds,
    config: &ControllerConfig,
    metrics: ReconcileMetrics,
    probes: ProbeState,
) -> Result<(), ControllerError> {
    info!("Starting Destination and CollectorsGroup watchers");

    let runtime_config = RuntimeConfig::default()
        .debounce(config.debounce)
        .concurrency(config.concurrency);

    let controller = Controller::new(kinds.destinations, watcher::Config::default()).with_config(runtime_config);
    let destinations = controller.store();
    let ctx = Arc::new(WatchContext::new(reconciler, metrics, destinations.clone(), config));

    let stream = controller
        .watches(kinds.collectors_groups, watcher::Config::default(), move |group: CollectorsGroup| {
            namespace_representative(&destinations.state(), group.metadata.namespace.as_deref())
        })
        .shutdown_on_signal()
        .run(reconcile_destination, error_policy, ctx);

    probes.set_ready(true);

    stream
        .for_each(|res| async move {
            match res {
                Ok((obj, _action)) => debug!(destination = %obj.name, "Reconciled"),
                Err(e) => warn!(error = %e, "Controller error"),
            }
        })
        .await;

    probes.set_ready(false);
    info!("Watchers stopped");
    Ok(())
}
