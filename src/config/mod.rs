//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → environment overrides (REDIS_URL, LOG_TEMPLATE_RESOURCE_*)
//!     → AppConfig (immutable)
//!     → shared with subsystems at construction
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Environment variables win over the file

pub mod loader;
pub mod schema;

pub use loader::{load_config, ConfigError};
pub use schema::AppConfig;
