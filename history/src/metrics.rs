//! Metrics instrumentation for the history index
//!
//! Provides Prometheus-compatible metrics for:
//! - Rebuild latency and outcome
//! - Snapshot size
//! - Raw records mapped to safe defaults

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::time::{Duration, Instant};

/// Metric names as constants for consistency
pub mod names {
    pub const REBUILD_DURATION: &str = "history_rebuild_duration_seconds";
    pub const REBUILDS: &str = "history_rebuilds_total";
    pub const RECORDS: &str = "history_records";
    pub const RECORDS_DEFAULTED: &str = "history_records_defaulted_total";
}

/// Record the outcome and latency of a rebuild
pub fn record_rebuild(duration: Duration, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    histogram!(names::REBUILD_DURATION, "outcome" => outcome).record(duration.as_secs_f64());
    counter!(names::REBUILDS, "outcome" => outcome).increment(1);
}

/// Set the size of the currently published snapshot
pub fn set_record_count(count: usize) {
    gauge!(names::RECORDS).set(count as f64);
}

/// Record a raw record whose fields were clamped to a safe default
pub fn record_defaulted(reason: &'static str) {
    counter!(names::RECORDS_DEFAULTED, "reason" => reason).increment(1);
}

/// Helper struct for timing operations
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Start a new timer
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Install the Prometheus recorder and return a handle for rendering.
///
/// Fails if a global recorder is already installed.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}
