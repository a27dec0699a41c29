//! Controller configuration.
//!
//! All settings come from environment variables and are read once at
//! startup. Every variable has a default except `WATCH_NAMESPACE`, which is
//! optional and selects all namespaces when unset.

use crate::error::ControllerError;
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_RECONCILE_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RESYNC_INTERVAL_SECS: u64 = 300;
const DEFAULT_BACKOFF_MIN_SECS: u64 = 1;
const DEFAULT_BACKOFF_MAX_SECS: u64 = 60;
const DEFAULT_DEBOUNCE_SECS: u64 = 1;
const DEFAULT_CONCURRENCY: u16 = 4;
const DEFAULT_PROBE_ADDR: &str = "0.0.0.0:8081";

/// Runtime settings for the scheduler controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Namespace to watch, or `None` for all namespaces
    pub watch_namespace: Option<String>,
    /// Deadline applied to every reconcile invocation
    pub reconcile_timeout: Duration,
    /// Requeue delay after a successful reconcile (periodic safety sweep)
    pub resync_interval: Duration,
    /// Smallest retry delay after a failed reconcile
    pub backoff_min: Duration,
    /// Largest retry delay after a failed reconcile
    pub backoff_max: Duration,
    /// Quiet period before a burst of events is reconciled
    pub debounce: Duration,
    /// Maximum concurrent reconciliations
    pub concurrency: u16,
    /// Listen address for health, readiness and metrics
    pub probe_addr: SocketAddr,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            watch_namespace: None,
            reconcile_timeout: Duration::from_secs(DEFAULT_RECONCILE_TIMEOUT_SECS),
            resync_interval: Duration::from_secs(DEFAULT_RESYNC_INTERVAL_SECS),
            backoff_min: Duration::from_secs(DEFAULT_BACKOFF_MIN_SECS),
            backoff_max: Duration::from_secs(DEFAULT_BACKOFF_MAX_SECS),
            debounce: Duration::from_secs(DEFAULT_DEBOUNCE_SECS),
            concurrency: DEFAULT_CONCURRENCY,
            probe_addr: SocketAddr::from(([0, 0, 0, 0], 8081)),
        }
    }
}

impl ControllerConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ControllerError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ControllerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let watch_namespace = lookup("WATCH_NAMESPACE")
            .map(|ns| ns.trim().to_string())
            .filter(|ns| !ns.is_empty());

        let reconcile_timeout = secs(&lookup, "RECONCILE_TIMEOUT_SECS", DEFAULT_RECONCILE_TIMEOUT_SECS)?;
        let resync_interval = secs(&lookup, "RESYNC_INTERVAL_SECS", DEFAULT_RESYNC_INTERVAL_SECS)?;
        let backoff_min = secs(&lookup, "RETRY_BACKOFF_MIN_SECS", DEFAULT_BACKOFF_MIN_SECS)?;
        let backoff_max = secs(&lookup, "RETRY_BACKOFF_MAX_SECS", DEFAULT_BACKOFF_MAX_SECS)?;
        let debounce = secs(&lookup, "RECONCILE_DEBOUNCE_SECS", DEFAULT_DEBOUNCE_SECS)?;
        let concurrency: u16 = parse(&lookup, "RECONCILE_CONCURRENCY", DEFAULT_CONCURRENCY)?;
        let probe_addr = lookup("PROBE_ADDR").unwrap_or_else(|| DEFAULT_PROBE_ADDR.to_string());
        let probe_addr = SocketAddr::from_str(&probe_addr).map_err(|e| {
            ControllerError::InvalidConfig(format!("PROBE_ADDR {probe_addr:?} is not a socket address: {e}"))
        })?;

        if reconcile_timeout.is_zero() {
            return Err(ControllerError::InvalidConfig(
                "RECONCILE_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }
        if backoff_min.is_zero() || backoff_min > backoff_max {
            return Err(ControllerError::InvalidConfig(format!(
                "retry backoff range {}s..{}s is invalid",
                backoff_min.as_secs(),
                backoff_max.as_secs()
            )));
        }
        if concurrency == 0 {
            return Err(ControllerError::InvalidConfig(
                "RECONCILE_CONCURRENCY must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            watch_namespace,
            reconcile_timeout,
            resync_interval,
            backoff_min,
            backoff_max,
            debounce,
            concurrency,
            probe_addr,
        })
    }
}

fn secs<F>(lookup: &F, key: &str, default: u64) -> Result<Duration, ControllerError>
where
    F: Fn(&str) -> Option<String>,
{
    parse(lookup, key, default).map(Duration::from_secs)
}

fn parse<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ControllerError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e| {
            ControllerError::InvalidConfig(format!("{key}={raw:?} could not be parsed: {e}"))
        }),
        None => Ok(default),
    }
}
