//! Scheduler Controller
//!
//! Keeps a gateway collector group available wherever telemetry destinations
//! are declared.
//!
//! This controller watches `Destination` and `CollectorsGroup` CRDs and, for
//! any namespace that has Destinations but no CollectorsGroup, creates the
//! `odigos-gateway` CollectorsGroup with the `GATEWAY` role.

mod backoff;
mod config;
mod controller;
mod error;
mod gateway;
mod metrics;
mod probes;
mod reconciler;
mod repository;
mod watcher;

#[cfg(test)]
mod test_utils;

use crate::config::ControllerConfig;
use crate::error::ControllerError;
use controller::Controller;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ControllerError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Scheduler Controller");

    let config = ControllerConfig::from_env()?;

    info!("Configuration:");
    info!("  Namespace: {}", config.watch_namespace.as_deref().unwrap_or("all namespaces"));
    info!("  Reconcile timeout: {:?}", config.reconcile_timeout);
    info!("  Resync interval: {:?}", config.resync_interval);
    info!("  Retry backoff: {:?}..{:?}", config.backoff_min, config.backoff_max);
    info!("  Probe address: {}", config.probe_addr);

    let controller = Controller::new(config).await?;
    controller.run().await?;

    Ok(())
}
