//! Feature flag registry library.

pub mod changelog;
pub mod config;
pub mod flags;
pub mod http;
pub mod observability;

pub use config::AppConfig;
pub use flags::{FeatureFlag, FlagService};
pub use http::HttpServer;
