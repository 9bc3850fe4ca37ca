//! Configuration loading from disk and the environment.

use std::env;
use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AppConfig;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Load configuration from a TOML file, then apply environment overrides.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config: AppConfig = toml::from_str(&content)?;
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Environment variables take precedence over the file. Templates follow
/// the `LOG_TEMPLATE_RESOURCE_<EVENT>` convention.
pub fn apply_env_overrides(config: &mut AppConfig) {
    if let Ok(url) = env::var("REDIS_URL") {
        config.redis.url = url;
    }
    if let Ok(template) = env::var("LOG_TEMPLATE_RESOURCE_CREATED") {
        config.log_templates.created = Some(template);
    }
    if let Ok(template) = env::var("LOG_TEMPLATE_RESOURCE_UPDATED") {
        config.log_templates.updated = Some(template);
    }
    if let Ok(template) = env::var("LOG_TEMPLATE_RESOURCE_DELETED") {
        config.log_templates.deleted = Some(template);
    }
}
