//! Feature flag data model.
//!
//! # Responsibilities
//! - Define the persisted flag record types
//! - Serialize configurations for hash storage (key excluded)
//! - Produce the flattened wire form `{key, state, variants, ...}`
//!
//! # Design Decisions
//! - A flag is immutable once constructed; upsert replaces the whole record
//! - Optional fields are omitted when absent, never persisted as null
//! - Homogeneity of variant values is enforced at write time by the
//!   validator, not re-checked on read

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Whether a flag is served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlagState {
    #[serde(rename = "ENABLED")]
    Enabled,
    #[serde(rename = "DISABLED")]
    Disabled,
}

/// Everything stored for a flag besides its key.
///
/// This is exactly the value serialized into the backing hash field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagConfiguration {
    pub state: FlagState,

    /// Variant name to served value. All values share one primitive kind.
    pub variants: Map<String, Value>,

    #[serde(rename = "defaultVariant", skip_serializing_if = "Option::is_none")]
    pub default_variant: Option<String>,

    /// Targeting rule tree. Validated against the external schema but never
    /// interpreted here.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub targeting: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

/// A feature flag record: unique key plus its configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFlag {
    pub key: String,
    pub configuration: FlagConfiguration,
}

impl FeatureFlag {
    pub fn new(key: impl Into<String>, configuration: FlagConfiguration) -> Self {
        Self {
            key: key.into(),
            configuration,
        }
    }

    /// Wire form: configuration fields merged alongside `key`.
    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        object.insert("key".to_string(), Value::String(self.key.clone()));
        if let Value::Object(fields) = serde_json::to_value(&self.configuration)
            .unwrap_or(Value::Object(Map::new()))
        {
            object.extend(fields);
        }
        Value::Object(object)
    }
}
