//! Job-level metrics and the Prometheus exporter.

use std::net::SocketAddr;

use ::metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Metric names as constants for consistency.
pub mod names {
    pub const JOBS_STARTED_TOTAL: &str = "vreel_jobs_started_total";
    pub const JOBS_COMPLETED_TOTAL: &str = "vreel_jobs_completed_total";
    pub const JOBS_FAILED_TOTAL: &str = "vreel_jobs_failed_total";
    pub const JOB_DURATION_SECONDS: &str = "vreel_job_duration_seconds";
}

/// Serve metrics on `addr`. Must run inside the tokio runtime.
pub fn install_exporter(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()
}

pub fn record_job_started() {
    counter!(names::JOBS_STARTED_TOTAL).increment(1);
}

pub fn record_job_completed(duration_secs: f64, backend: &'static str) {
    counter!(names::JOBS_COMPLETED_TOTAL, "backend" => backend).increment(1);
    histogram!(names::JOB_DURATION_SECONDS).record(duration_secs);
}

pub fn record_job_failed(kind: &'static str) {
    counter!(names::JOBS_FAILED_TOTAL, "kind" => kind).increment(1);
}
