//! Schema-based validation of targeting and metadata trees.
//!
//! # Responsibilities
//! - Load the external schema document from disk
//! - Resolve and compile the two addressable sub-schemas
//! - Turn engine errors into deduplicated message strings
//!
//! # Design Decisions
//! - The schema document is an injected artifact; the rule grammar itself
//!   lives entirely in `schemas/flags.json`, not in code
//! - Compilation happens once at startup; a missing or malformed document
//!   is fatal there, never per-request
//! - Messages are deduplicated by exact text in first-seen order, which is
//!   deterministic for identical input

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use jsonschema::Validator;
use serde_json::Value;
use thiserror::Error;

/// The sub-schemas addressable within the schema document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaRef {
    Targeting,
    Metadata,
}

/// Errors raised while loading or compiling the schema document.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to read schema document: {0}")]
    Io(#[from] std::io::Error),

    #[error("schema document is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("schema document has no value at {0}")]
    MissingRef(String),

    #[error("sub-schema at {pointer} failed to compile: {message}")]
    Compile { pointer: String, message: String },
}

/// Compiled validators for the targeting and metadata sub-schemas.
pub struct SchemaValidator {
    targeting: Validator,
    metadata: Validator,
}

impl SchemaValidator {
    /// Loads the schema document and compiles the sub-schemas at the given
    /// JSON-pointer refs (e.g. `#/definitions/targeting`).
    pub fn from_file(
        path: &Path,
        targeting_ref: &str,
        metadata_ref: &str,
    ) -> Result<Self, SchemaError> {
        let raw = fs::read_to_string(path)?;
        let document: Value = serde_json::from_str(&raw)?;

        Ok(Self {
            targeting: compile_ref(&document, targeting_ref)?,
            metadata: compile_ref(&document, metadata_ref)?,
        })
    }

    /// Validates `value` against the addressed sub-schema. Returns one
    /// message per distinct failure; an empty vec means valid.
    pub fn validate(&self, schema_ref: SchemaRef, value: &Value) -> Vec<String> {
        let validator = match schema_ref {
            SchemaRef::Targeting => &self.targeting,
            SchemaRef::Metadata => &self.metadata,
        };

        let mut seen = HashSet::new();
        validator
            .iter_errors(value)
            .map(|error| error.to_string())
            .filter(|message| seen.insert(message.clone()))
            .collect()
    }
}

fn compile_ref(document: &Value, reference: &str) -> Result<Validator, SchemaError> {
    let pointer = reference.trim_start_matches('#');
    let sub_schema = document
        .pointer(pointer)
        .ok_or_else(|| SchemaError::MissingRef(reference.to_string()))?;

    jsonschema::validator_for(sub_schema).map_err(|error| SchemaError::Compile {
        pointer: reference.to_string(),
        message: error.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    fn validator() -> SchemaValidator {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("schemas/flags.json");
        SchemaValidator::from_file(
            &path,
            "#/definitions/targeting",
            "#/definitions/metadata",
        )
        .unwrap()
    }

    #[test]
    fn valid_targeting_produces_no_errors() {
        let targeting = json!({
            "if": [
                {"ends_with": [{"var": "email"}, "@example.com"]},
                "blue",
            ],
        });
        assert!(validator()
            .validate(SchemaRef::Targeting, &targeting)
            .is_empty());
    }

    #[test]
    fn unknown_targeting_operator_is_rejected() {
        let errors = validator().validate(SchemaRef::Targeting, &json!({"foo": "bar"}));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn valid_metadata_produces_no_errors() {
        let metadata = json!({"team": "infrastructure", "version": 3, "beta": true});
        assert!(validator()
            .validate(SchemaRef::Metadata, &metadata)
            .is_empty());
    }

    #[test]
    fn metadata_values_must_be_primitive() {
        let errors = validator().validate(SchemaRef::Metadata, &json!({"label": {}}));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn duplicate_messages_are_collapsed() {
        // Both properties fail the type check with identical text, so a
        // single message survives.
        let errors = validator().validate(SchemaRef::Metadata, &json!({"a": {}, "b": {}}));
        assert_eq!(errors.len(), 1);

        // Distinct texts are all kept.
        let errors = validator().validate(SchemaRef::Metadata, &json!({"a": {}, "b": []}));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn missing_ref_fails_at_load() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("schemas/flags.json");
        let result =
            SchemaValidator::from_file(&path, "#/definitions/nope", "#/definitions/metadata");
        assert!(matches!(result, Err(SchemaError::MissingRef(_))));
    }
}
