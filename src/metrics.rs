//! Translation metrics and observability module.
//!
//! Counters for translation traffic: how often the gateway actually hits the
//! network, how often it short-circuits, how often it degrades, and how often
//! direction disambiguation had to swap its assumption.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

/// Global translation metrics singleton.
pub struct TranslationMetrics {
    /// Number of translation requests sent to the remote engine
    requests: AtomicUsize,

    /// Number of requests that resolved to "translation unavailable"
    failures: AtomicUsize,

    /// Number of calls answered without a network round trip
    /// (empty text or same-language pair)
    short_circuits: AtomicUsize,

    /// Number of times the identity signal forced a swapped retry
    direction_retries: AtomicUsize,
}

/// Global metrics instance (initialized lazily)
static METRICS: OnceLock<TranslationMetrics> = OnceLock::new();

impl TranslationMetrics {
    /// Create a zeroed metrics instance.
    ///
    /// Production code goes through [`TranslationMetrics::global`]; tests
    /// construct their own instance to avoid cross-test interference.
    pub fn new() -> Self {
        TranslationMetrics {
            requests: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
            short_circuits: AtomicUsize::new(0),
            direction_retries: AtomicUsize::new(0),
        }
    }

    /// Get the global translation metrics instance.
    pub fn global() -> &'static TranslationMetrics {
        METRICS.get_or_init(TranslationMetrics::new)
    }

    /// Record a request sent to the translation engine.
    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a degraded outcome (translation unavailable).
    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a call answered without any network round trip.
    pub fn record_short_circuit(&self) {
        self.short_circuits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a direction swap triggered by the identity signal.
    pub fn record_direction_retry(&self) {
        self.direction_retries.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current request count.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }

    /// Get the current failure count.
    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }

    /// Get the current short-circuit count.
    pub fn short_circuits(&self) -> usize {
        self.short_circuits.load(Ordering::Relaxed)
    }

    /// Get the current direction-retry count.
    pub fn direction_retries(&self) -> usize {
        self.direction_retries.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let requests = self.requests();
        let failures = self.failures();
        let success_rate = if requests > 0 {
            ((requests - failures.min(requests)) as f64 / requests as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            requests,
            failures,
            success_rate,
            short_circuits: self.short_circuits(),
            direction_retries: self.direction_retries(),
        }
    }

}

impl Default for TranslationMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Metrics report containing current translation statistics.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    /// Number of requests sent to the translation engine
    pub requests: usize,

    /// Number of degraded outcomes
    pub failures: usize,

    /// Request success rate as a percentage (0-100)
    pub success_rate: f64,

    /// Number of calls answered without a network round trip
    pub short_circuits: usize,

    /// Number of identity-signal direction swaps
    pub direction_retries: usize,
}
