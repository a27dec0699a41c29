//! Prometheus metrics for reconciliation.

use crate::error::ControllerError;
use crate::reconciler::ReconcileOutcome;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder};
use std::time::Duration;

/// Reconciliation counters and timings
#[derive(Clone)]
pub struct ReconcileMetrics {
    registry: Registry,
    /// Reconciles by outcome
    pub reconcile_total: IntCounterVec,
    /// Failed reconciles by error kind
    pub reconcile_errors_total: IntCounterVec,
    /// Reconcile duration
    pub reconcile_duration_seconds: Histogram,
}

impl std::fmt::Debug for ReconcileMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconcileMetrics").finish_non_exhaustive()
    }
}

impl ReconcileMetrics {
    /// Create and register the metrics in a fresh registry
    pub fn new() -> Result<Self, ControllerError> {
        let registry = Registry::new();

        let reconcile_total = IntCounterVec::new(
            Opts::new("scheduler_reconcile_total", "Reconciliations by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(reconcile_total.clone()))?;

        let reconcile_errors_total = IntCounterVec::new(
            Opts::new("scheduler_reconcile_errors_total", "Failed reconciliations by error kind"),
            &["kind"],
        )?;
        registry.register(Box::new(reconcile_errors_total.clone()))?;

        let reconcile_duration_seconds = Histogram::with_opts(
            HistogramOpts::new("scheduler_reconcile_duration_seconds", "Reconciliation duration")
                .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 5.0, 30.0]),
        )?;
        registry.register(Box::new(reconcile_duration_seconds.clone()))?;

        Ok(Self {
            registry,
            reconcile_total,
            reconcile_errors_total,
            reconcile_duration_seconds,
        })
    }

    /// Record one finished reconcile
    pub fn observe(&self, result: &Result<ReconcileOutcome, ControllerError>, elapsed: Duration) {
        self.reconcile_duration_seconds.observe(elapsed.as_secs_f64());
        match result {
            Ok(outcome) => self.reconcile_total.with_label_values(&[outcome.label()]).inc(),
            Err(e) => {
                self.reconcile_total.with_label_values(&["error"]).inc();
                self.reconcile_errors_total.with_label_values(&[e.kind()]).inc();
            }
        }
    }

    /// Export metrics in Prometheus text format
    pub fn export(&self) -> Result<String, ControllerError> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| ControllerError::Probe(format!("metrics are not UTF-8: {e}")))
    }
}
