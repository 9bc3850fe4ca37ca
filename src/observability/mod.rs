//! Observability subsystem.
//!
//! # Design Decisions
//! - Structured logging via tracing; request IDs flow through tower-http
//! - Metrics are cheap (atomic increments) and scraped at /metrics

pub mod logging;
pub mod metrics;
