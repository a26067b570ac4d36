//! # Validator Adapter
//!
//! Wraps a compiled Draft 2020-12 `jsonschema::Validator` for checking
//! example instances.
//!
//! ## Metadata handling
//!
//! Examples may carry one top-level metadata key, `$schemaRef`, naming the
//! schema they claim to satisfy. [`ExampleValidator::validate`] drops that
//! key from a shallow copy before validation. Nothing else is special-cased:
//! a nested `$schemaRef` is ordinary data.
//!
//! [`check_envelope`] is independent of the schema. It flags persistence
//! keys (`id`, `schemaVersion`) and any other `$`-prefixed top-level key.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::store::SchemaStore;

/// The one top-level metadata key tolerated on examples.
pub const SCHEMA_REF_KEY: &str = "$schemaRef";

/// Top-level keys reserved for the persistence layer.
pub const FORBIDDEN_ENVELOPE_KEYS: &[&str] = &["id", "schemaVersion"];

/// A `(pointer, message)` finding, ordered by pointer then message.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ValidationIssue {
    /// JSON pointer into the instance; empty for file-level issues.
    pub pointer: String,
    /// Human-readable cause.
    pub message: String,
}

impl ValidationIssue {
    /// A file-level issue with an empty pointer.
    pub fn file_level(message: impl Into<String>) -> Self {
        Self {
            pointer: String::new(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pointer = if self.pointer.is_empty() {
            "/"
        } else {
            &self.pointer
        };
        write!(f, "{pointer}: {}", self.message)
    }
}

/// A schema that failed to compile.
#[derive(Error, Debug, Clone)]
#[error("failed to compile schema {schema}: {reason}")]
pub struct ValidatorBuildError {
    /// Label of the schema (path or filename).
    pub schema: String,
    /// Compiler message.
    pub reason: String,
}

/// Compiled validator for one schema, with cross-file `$ref`s served from
/// the store.
pub struct ExampleValidator {
    label: String,
    validator: jsonschema::Validator,
}

impl fmt::Debug for ExampleValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExampleValidator")
            .field("schema", &self.label)
            .finish()
    }
}

impl ExampleValidator {
    /// Compile `schema` once.
    ///
    /// # Errors
    ///
    /// Fails when the schema is invalid or references a document the store
    /// does not hold.
    pub fn new(
        schema: &Value,
        store: &SchemaStore,
        label: &str,
    ) -> Result<Self, ValidatorBuildError> {
        let validator = jsonschema::options()
            .with_draft(jsonschema::Draft::Draft202012)
            .with_retriever(store.retriever())
            .build(schema)
            .map_err(|e| ValidatorBuildError {
                schema: label.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            label: label.to_string(),
            validator,
        })
    }

    /// Label given at construction.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Every schema error for `instance`, sorted.
    pub fn validate(&self, instance: &Value) -> Vec<ValidationIssue> {
        let stripped = strip_schema_ref(instance);
        let mut issues: Vec<ValidationIssue> = self
            .validator
            .iter_errors(&stripped)
            .map(|err| ValidationIssue {
                pointer: err.instance_path.to_string(),
                message: err.to_string(),
            })
            .collect();
        issues.sort();
        issues
    }
}

/// Shallow copy of `instance` without a top-level `$schemaRef`.
pub fn strip_schema_ref(instance: &Value) -> Value {
    match instance {
        Value::Object(map) if map.contains_key(SCHEMA_REF_KEY) => Value::Object(
            map.iter()
                .filter(|(k, _)| k.as_str() != SCHEMA_REF_KEY)
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Top-level envelope findings, in key order.
pub fn check_envelope(instance: &Value) -> Vec<ValidationIssue> {
    let Value::Object(map) = instance else {
        return vec![ValidationIssue::file_level("Top-level is not an object")];
    };
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();

    let mut issues = Vec::new();
    for key in keys {
        let message = if FORBIDDEN_ENVELOPE_KEYS.contains(&key.as_str()) {
            format!("Forbidden top-level key: {key}")
        } else if key.starts_with('$') && key != SCHEMA_REF_KEY {
            format!("Unknown top-level metadata key: {key}")
        } else {
            continue;
        };
        issues.push(ValidationIssue {
            pointer: synschema_core::json_pointer([key]),
            message,
        });
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const BASE: &str = "https://schemas.synesthetic.dev";

    fn empty_store() -> SchemaStore {
        SchemaStore::from_documents(BASE, Vec::new())
    }

    fn strict_schema() -> Value {
        json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "type": "object",
            "additionalProperties": false,
            "required": ["name"],
            "properties": {
                "name": {"type": "string", "minLength": 1},
                "meta": {"type": "object"}
            }
        })
    }

    #[test]
    fn schema_ref_is_tolerated_at_top_level_only() {
        let v = ExampleValidator::new(&strict_schema(), &empty_store(), "strict").unwrap();
        assert!(v
            .validate(&json!({"name": "Widget", "$schemaRef": "x.schema.json"}))
            .is_empty());

        let nested = v.validate(&json!({"name": "W", "meta": {"$schemaRef": "x"}}));
        assert!(nested.is_empty(), "nested key is plain data for an open object");
    }

    #[test]
    fn strip_leaves_original_untouched() {
        let original = json!({"$schemaRef": "a", "name": "b"});
        let stripped = strip_schema_ref(&original);
        assert_eq!(stripped, json!({"name": "b"}));
        assert_eq!(original["$schemaRef"], "a");
    }

    #[test]
    fn errors_are_sorted_by_pointer() {
        let v = ExampleValidator::new(&strict_schema(), &empty_store(), "strict").unwrap();
        let issues = v.validate(&json!({"name": "", "meta": 3, "extra": true}));
        assert!(issues.len() >= 3);
        let pointers: Vec<_> = issues.iter().map(|i| i.pointer.clone()).collect();
        let mut sorted = pointers.clone();
        sorted.sort();
        assert_eq!(pointers, sorted);
        assert!(pointers.iter().any(|p| p == "/meta"));
        assert!(pointers.iter().any(|p| p == "/name"));
    }

    #[test]
    fn cross_file_refs_resolve_from_store() {
        let store = SchemaStore::from_documents(
            BASE,
            vec![(
                "tone.schema.json".to_string(),
                json!({
                    "$schema": "https://json-schema.org/draft/2020-12/schema",
                    "$id": "https://schemas.synesthetic.dev/0.7.3/tone.schema.json",
                    "type": "object",
                    "required": ["engine"]
                }),
            )],
        );
        let schema = json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "$id": "https://schemas.synesthetic.dev/0.7.3/synesthetic-asset.schema.json",
            "type": "object",
            "properties": {
                "tone": {"$ref": "https://schemas.synesthetic.dev/0.7.3/tone.schema.json"}
            }
        });
        let v = ExampleValidator::new(&schema, &store, "asset").unwrap();
        assert!(v.validate(&json!({"tone": {"engine": "x"}})).is_empty());
        let issues = v.validate(&json!({"tone": {}}));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].pointer, "/tone");
    }

    #[test]
    fn unknown_remote_ref_fails_to_compile() {
        let schema = json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "properties": {"x": {"$ref": "https://elsewhere.example/thing.schema.json"}}
        });
        let err = ExampleValidator::new(&schema, &empty_store(), "bad").unwrap_err();
        assert_eq!(err.schema, "bad");
    }

    #[test]
    fn envelope_flags_persistence_and_unknown_metadata() {
        let issues = check_envelope(&json!({
            "id": 1,
            "schemaVersion": "0.7.3",
            "$schemaRef": "ok",
            "$comment": "no",
            "name": "fine"
        }));
        assert_eq!(
            issues,
            vec![
                ValidationIssue {
                    pointer: "/$comment".into(),
                    message: "Unknown top-level metadata key: $comment".into()
                },
                ValidationIssue {
                    pointer: "/id".into(),
                    message: "Forbidden top-level key: id".into()
                },
                ValidationIssue {
                    pointer: "/schemaVersion".into(),
                    message: "Forbidden top-level key: schemaVersion".into()
                },
            ]
        );
    }

    #[test]
    fn envelope_allows_schema_ref_alone() {
        assert!(check_envelope(&json!({"$schemaRef": "x"})).is_empty());
    }

    #[test]
    fn envelope_rejects_non_object() {
        let issues = check_envelope(&json!([1, 2]));
        assert_eq!(issues, vec![ValidationIssue::file_level("Top-level is not an object")]);
    }

    #[test]
    fn issue_display_uses_slash_for_root() {
        assert_eq!(ValidationIssue::file_level("bad").to_string(), "/: bad");
    }
}
