//! Prediction counters and latency statistics.
//!
//! Only aggregates are kept; individual predictions are never retained.

use crate::types::prediction::Verdict;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

const LATENCY_WINDOW: usize = 1000;

/// Metrics collector for the scorer
pub struct PredictionMetrics {
    /// Successful predictions
    pub predictions: AtomicU64,
    /// Predictions with a fraudulent verdict
    pub fraudulent: AtomicU64,
    /// Model calls that failed
    pub failures: AtomicU64,
    /// Scoring times (in microseconds), most recent window only
    latencies: RwLock<Vec<u64>>,
    start_time: Instant,
}

impl PredictionMetrics {
    pub fn new() -> Self {
        Self {
            predictions: AtomicU64::new(0),
            fraudulent: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            latencies: RwLock::new(Vec::with_capacity(LATENCY_WINDOW)),
            start_time: Instant::now(),
        }
    }

    /// Record a successful prediction
    pub fn record_prediction(&self, elapsed: Duration, verdict: Verdict) {
        self.predictions.fetch_add(1, Ordering::Relaxed);
        if verdict.is_fraudulent() {
            self.fraudulent.fetch_add(1, Ordering::Relaxed);
        }
        self.record_latency(elapsed);
    }

    /// Record a failed model call
    pub fn record_failure(&self, elapsed: Duration) {
        self.failures.fetch_add(1, Ordering::Relaxed);
        self.record_latency(elapsed);
    }

    fn record_latency(&self, elapsed: Duration) {
        if let Ok(mut times) = self.latencies.write() {
            times.push(elapsed.as_micros() as u64);
            if times.len() > LATENCY_WINDOW {
                times.drain(0..LATENCY_WINDOW / 2);
            }
        }
    }

    /// Point-in-time view of the counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            predictions: self.predictions.load(Ordering::Relaxed),
            fraudulent: self.fraudulent.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            latency: self.latency_stats(),
            uptime_secs: self.start_time.elapsed().as_secs(),
        }
    }

    /// Latency statistics over the retained window
    pub fn latency_stats(&self) -> LatencyStats {
        let sorted = match self.latencies.read() {
            Ok(times) if !times.is_empty() => {
                let mut sorted = times.clone();
                sorted.sort_unstable();
                sorted
            }
            _ => return LatencyStats::default(),
        };

        let count = sorted.len();
        let sum: u64 = sorted.iter().sum();

        LatencyStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p99_us: sorted[((count as f64 * 0.99) as usize).min(count - 1)],
            max_us: sorted[count - 1],
        }
    }

    /// Log summary statistics
    pub fn log_summary(&self) {
        let snapshot = self.snapshot();
        let fraud_rate = if snapshot.predictions > 0 {
            (snapshot.fraudulent as f64 / snapshot.predictions as f64) * 100.0
        } else {
            0.0
        };

        info!(
            predictions = snapshot.predictions,
            fraudulent = snapshot.fraudulent,
            failures = snapshot.failures,
            fraud_rate = format!("{:.1}%", fraud_rate),
            mean_us = snapshot.latency.mean_us,
            p99_us = snapshot.latency.p99_us,
            uptime_secs = snapshot.uptime_secs,
            "Prediction summary"
        );
    }
}

impl Default for PredictionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoring time statistics
#[derive(Debug, Default, Clone, Serialize)]
pub struct LatencyStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub predictions: u64,
    pub fraudulent: u64,
    pub failures: u64,
    pub latency: LatencyStats,
    pub uptime_secs: u64,
}
