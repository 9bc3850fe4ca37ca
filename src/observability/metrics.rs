//! Metrics collection and exposition.
//!
//! # Metrics
//! - `flags_created_total` (counter): flags created via upsert
//! - `flags_updated_total` (counter): flags replaced via upsert
//! - `flags_deleted_total` (counter): flags deleted
//!
//! # Design Decisions
//! - The Prometheus recorder is installed once at startup; the handle is
//!   rendered by `GET /metrics`

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the global Prometheus recorder and return its render handle.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}
