//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! registry. All types derive Serde traits for deserialization from config
//! files.

use serde::{Deserialize, Serialize};

/// Root configuration for the flag registry.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Backing store configuration.
    pub redis: RedisConfig,

    /// Schema document configuration.
    pub schema: SchemaConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Change-log template overrides.
    pub log_templates: LogTemplatesConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g. "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Backing store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RedisConfig {
    /// Connection URL. Overridable via the `REDIS_URL` environment
    /// variable.
    pub url: String,

    /// Hash key under which flag fields are stored.
    pub flags_key: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            flags_key: crate::flags::store::DEFAULT_FLAGS_KEY.to_string(),
        }
    }
}

/// Schema document configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Path to the external schema document.
    pub path: String,

    /// JSON-pointer ref of the targeting sub-schema.
    pub targeting_ref: String,

    /// JSON-pointer ref of the metadata sub-schema.
    pub metadata_ref: String,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            path: "schemas/flags.json".to_string(),
            targeting_ref: "#/definitions/targeting".to_string(),
            metadata_ref: "#/definitions/metadata".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Whole-request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Change-log template overrides, one per event kind. `None` selects the
/// built-in default. Overridable via `LOG_TEMPLATE_RESOURCE_CREATED`,
/// `LOG_TEMPLATE_RESOURCE_UPDATED`, and `LOG_TEMPLATE_RESOURCE_DELETED`.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct LogTemplatesConfig {
    pub created: Option<String>,
    pub updated: Option<String>,
    pub deleted: Option<String>,
}
