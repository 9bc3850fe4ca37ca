//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the logging subsystem once at startup
//!
//! # Design Decisions
//! - Uses the tracing crate for structured logging
//! - Log level configurable via `RUST_LOG`
//! - Change-log lines are ordinary info-level events; durability is
//!   whatever the log sink provides

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber. Call once, before anything logs.
pub fn init() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flag_registry=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
