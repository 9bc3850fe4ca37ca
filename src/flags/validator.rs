//! Candidate flag validation.
//!
//! # Responsibilities
//! - Structural checks (key presence, state enum membership)
//! - Cross-field consistency (default variant names an existing variant)
//! - Variant value homogeneity
//! - Schema-based validation of targeting and metadata trees
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first: every structurally
//!   independent rule runs; a dependent rule skips only when its
//!   precondition fails (default-variant membership requires variants to be
//!   an object)
//! - Field and message ordering are preserved so responses are stable
//! - On success the candidate collapses into a typed configuration holding
//!   only the fields that were actually supplied

use std::sync::Arc;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::flags::model::{FlagConfiguration, FlagState};
use crate::flags::schema::{SchemaRef, SchemaValidator};

/// An inbound upsert body before validation. Fields stay loosely typed so
/// every rule can run and report instead of failing at deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlagCandidate {
    #[serde(default)]
    pub key: String,

    #[serde(default)]
    pub state: String,

    #[serde(default)]
    pub variants: Value,

    #[serde(rename = "defaultVariant", default)]
    pub default_variant: Option<String>,

    #[serde(default)]
    pub targeting: Option<Value>,

    #[serde(default)]
    pub metadata: Option<Value>,
}

/// Per-field validation failures, in rule evaluation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors {
    fields: Vec<(String, Vec<String>)>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Messages recorded for `field`, empty if the field passed.
    pub fn messages(&self, field: &str) -> &[String] {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, messages)| messages.as_slice())
            .unwrap_or(&[])
    }

    fn add(&mut self, field: &str, message: impl Into<String>) {
        match self.fields.iter_mut().find(|(name, _)| name == field) {
            Some((_, messages)) => messages.push(message.into()),
            None => self.fields.push((field.to_string(), vec![message.into()])),
        }
    }
}

// Serializes as `{field: [{"message": m}, ...], ...}` preserving order.
impl Serialize for ValidationErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct FieldError<'a> {
            message: &'a str,
        }

        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (field, messages) in &self.fields {
            let entries: Vec<FieldError> = messages
                .iter()
                .map(|message| FieldError { message })
                .collect();
            map.serialize_entry(field, &entries)?;
        }
        map.end()
    }
}

/// Validates candidate flags before any write reaches the store.
pub struct FlagValidator {
    schema: Arc<SchemaValidator>,
}

impl FlagValidator {
    pub fn new(schema: Arc<SchemaValidator>) -> Self {
        Self { schema }
    }

    /// Runs every applicable rule. On success returns the typed
    /// configuration carrying only the supplied fields.
    pub fn validate(
        &self,
        candidate: &FlagCandidate,
    ) -> Result<FlagConfiguration, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        if candidate.key.trim().is_empty() {
            errors.add("key", "can't be blank");
        }

        if candidate.state != "ENABLED" && candidate.state != "DISABLED" {
            errors.add("state", "must be \"ENABLED\" or \"DISABLED\"");
        }

        match candidate.variants.as_object() {
            None => errors.add("variants", "must be a JSON object"),
            Some(variants) => {
                if !homogeneous(variants) {
                    errors.add("variants", "must have values of the same type");
                }
                if let Some(default_variant) = &candidate.default_variant {
                    if !variants.contains_key(default_variant) {
                        errors.add("defaultVariant", "must be one of the variants");
                    }
                }
            }
        }

        if let Some(targeting) = &candidate.targeting {
            for message in self.schema.validate(SchemaRef::Targeting, targeting) {
                errors.add("targeting", message);
            }
        }

        if let Some(metadata) = &candidate.metadata {
            for message in self.schema.validate(SchemaRef::Metadata, metadata) {
                errors.add("metadata", message);
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(FlagConfiguration {
            state: if candidate.state == "ENABLED" {
                FlagState::Enabled
            } else {
                FlagState::Disabled
            },
            variants: candidate
                .variants
                .as_object()
                .cloned()
                .unwrap_or_default(),
            default_variant: candidate.default_variant.clone(),
            targeting: candidate.targeting.clone(),
            metadata: candidate
                .metadata
                .as_ref()
                .and_then(Value::as_object)
                .cloned(),
        })
    }
}

/// True when all variant values are booleans, all numbers, all strings, or
/// all objects. An empty map is vacuously homogeneous.
fn homogeneous(variants: &Map<String, Value>) -> bool {
    variants.values().all(Value::is_boolean)
        || variants.values().all(Value::is_number)
        || variants.values().all(Value::is_string)
        || variants.values().all(Value::is_object)
}
