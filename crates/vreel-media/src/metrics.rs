//! Render pipeline metrics.

use ::metrics::{counter, histogram};

/// Metric names as constants for consistency.
pub mod names {
    pub const STAGE_DURATION_SECONDS: &str = "vreel_stage_duration_seconds";
    pub const STAGE_FAILURES_TOTAL: &str = "vreel_stage_failures_total";
    pub const ASSET_BYTES_TOTAL: &str = "vreel_asset_bytes_total";
    pub const OVERLAY_BACKEND_TOTAL: &str = "vreel_overlay_backend_total";
}

/// Record how long a compositor stage took.
pub fn record_stage(stage: &'static str, duration_secs: f64) {
    histogram!(names::STAGE_DURATION_SECONDS, "stage" => stage).record(duration_secs);
}

/// Record a stage that aborted the job.
pub fn record_stage_failure(stage: &'static str) {
    counter!(names::STAGE_FAILURES_TOTAL, "stage" => stage).increment(1);
}

/// Record downloaded bytes by asset kind.
pub fn record_asset_bytes(kind: &'static str, bytes: u64) {
    counter!(names::ASSET_BYTES_TOTAL, "kind" => kind).increment(bytes);
}

/// Record which overlay backend a job used.
pub fn record_backend(backend: &'static str) {
    counter!(names::OVERLAY_BACKEND_TOTAL, "backend" => backend).increment(1);
}
