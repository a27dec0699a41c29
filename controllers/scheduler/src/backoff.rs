//! # Fibonacci Backoff
//!
//! Retry delays for failed reconciles. The reconciler itself never retries;
//! the watcher's error policy asks this module how long to wait before the
//! namespace is reconciled again.
//!
//! With the default 1s..60s range the sequence is 1s, 1s, 2s, 3s, 5s, 8s,
//! 13s, 21s, 34s, 55s, 60s (max).

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Fibonacci backoff calculator
///
/// Each delay is the sum of the previous two, capped at `max`.
#[derive(Debug, Clone)]
pub struct FibonacciBackoff {
    min: Duration,
    prev: Duration,
    current: Duration,
    max: Duration,
}

impl FibonacciBackoff {
    /// Create a new Fibonacci backoff between `min` and `max`
    #[must_use]
    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            min,
            prev: Duration::ZERO,
            current: min,
            max,
        }
    }

    /// Get the next backoff duration and advance the sequence
    pub fn next_backoff(&mut self) -> Duration {
        let result = self.current;
        let next = self.prev.saturating_add(self.current);

        self.prev = self.current;
        self.current = std::cmp::min(next, self.max);

        result
    }

    /// Reset the backoff to the initial state
    pub fn reset(&mut self) {
        self.prev = Duration::ZERO;
        self.current = self.min;
    }
}

/// Per-namespace backoff tracking for the error policy.
///
/// Entries that have not failed again within `retention` are dropped, so a
/// namespace deleted while failing does not stay tracked forever.
#[derive(Debug)]
pub struct NamespaceBackoff {
    min: Duration,
    max: Duration,
    retention: Duration,
    states: Mutex<HashMap<String, TrackedBackoff>>,
}

#[derive(Debug)]
struct TrackedBackoff {
    backoff: FibonacciBackoff,
    last_failure: Instant,
}

impl NamespaceBackoff {
    /// Create tracking with the given range and retention
    #[must_use]
    pub fn new(min: Duration, max: Duration, retention: Duration) -> Self {
        Self {
            min,
            max,
            retention,
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Next retry delay for `namespace` after another failure
    pub fn next_for(&self, namespace: &str) -> Duration {
        self.next_for_at(namespace, Instant::now())
    }

    fn next_for_at(&self, namespace: &str, now: Instant) -> Duration {
        let mut states = self.states.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        states.retain(|_, tracked| now.saturating_duration_since(tracked.last_failure) <= self.retention);

        let tracked = states.entry(namespace.to_string()).or_insert_with(|| TrackedBackoff {
            backoff: FibonacciBackoff::new(self.min, self.max),
            last_failure: now,
        });
        tracked.last_failure = now;
        tracked.backoff.next_backoff()
    }

    /// Forget the failure history of `namespace` after a success
    pub fn reset(&self, namespace: &str) {
        let mut states = self.states.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        states.remove(namespace);
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.states.lock().unwrap().len()
    }
}
