//! Feature flag registry.
//!
//! A REST service managing feature-flag records stored as fields of one
//! Redis hash, built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌────────────────────────────────────────────┐
//!                      │               FLAG REGISTRY                │
//!                      │                                            │
//!   Client Request     │  ┌───────┐   ┌───────────┐   ┌──────────┐  │
//!   ──────────────────►│  │ http  │──►│ validator │──►│  store   │──┼──► Redis hash
//!                      │  │ layer │   │ + schema  │   │ (list/   │  │
//!                      │  └───────┘   └───────────┘   │  upsert/ │  │
//!                      │       │                      │  delete) │  │
//!                      │       │                      └────┬─────┘  │
//!                      │       │                           │        │
//!                      │       ▼                           ▼        │
//!                      │  ┌──────────┐            ┌─────────────┐   │
//!   Client Response    │  │ error    │            │ change-log  │   │
//!   ◄──────────────────┼──│ mapping  │            │ formatter   │──►│ log line
//!                      │  └──────────┘            └─────────────┘   │
//!                      │                                            │
//!                      │  Cross-cutting: config, observability      │
//!                      └────────────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use flag_registry::changelog::ChangeLogFormatter;
use flag_registry::config::{self, AppConfig};
use flag_registry::flags::schema::SchemaValidator;
use flag_registry::flags::store::{FlagStore, RedisFlagHash};
use flag_registry::flags::{FlagService, FlagValidator};
use flag_registry::http::HttpServer;
use flag_registry::observability;

#[derive(Parser)]
#[command(name = "flag-registry", version, about = "Feature flag registry")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    observability::logging::init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => {
            let mut config = AppConfig::default();
            config::loader::apply_env_overrides(&mut config);
            config
        }
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        flags_key = %config.redis.flags_key,
        schema_path = %config.schema.path,
        "Configuration loaded"
    );

    let metrics = observability::metrics::install_recorder()?;

    // Schema problems are fatal here, never per-request.
    let schema = Arc::new(SchemaValidator::from_file(
        Path::new(&config.schema.path),
        &config.schema.targeting_ref,
        &config.schema.metadata_ref,
    )?);

    let client = redis::Client::open(config.redis.url.as_str())?;
    let connection = client.get_connection_manager().await?;
    tracing::info!("Connected to Redis");

    let store = FlagStore::new(Arc::new(RedisFlagHash::new(
        connection,
        config.redis.flags_key.clone(),
    )));
    let service = Arc::new(FlagService::new(
        store,
        FlagValidator::new(schema),
        ChangeLogFormatter::new(&config.log_templates)?,
    ));

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    HttpServer::new(&config, service, metrics).run(listener).await?;

    Ok(())
}
