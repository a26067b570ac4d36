//! # Per-Example Schema Selection
//!
//! Validates examples against the schema each one claims rather than the
//! single asset schema. The claim is the top-level `$schemaRef` (URL or
//! path, matched by basename against the store). Without one, and unless
//! strict, the lowercased filename is matched against [`SCHEMA_TOKENS`] in
//! order; the first token contained in the name wins.

use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use synschema_schema::{
    check_envelope, ExampleValidator, SchemaStore, ValidationIssue, SCHEMA_REF_KEY,
};

/// Filename token -> schema filename. Order matters: longer tokens that
/// contain shorter ones come first.
pub const SCHEMA_TOKENS: &[(&str, &str)] = &[
    ("synestheticasset", "synesthetic-asset.schema.json"),
    ("asset", "synesthetic-asset.schema.json"),
    ("control-bundle", "control-bundle.schema.json"),
    ("control", "control.schema.json"),
    ("shader", "shader.schema.json"),
    ("tone", "tone.schema.json"),
    ("haptic", "haptic.schema.json"),
    ("rule-bundle", "rule-bundle.schema.json"),
    ("rule", "rule.schema.json"),
];

/// Why no schema could be chosen for an example.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// `$schemaRef` names a schema the store does not hold.
    #[error("$schemaRef not recognized: {0}")]
    UnrecognizedRef(String),

    /// Strict mode and no `$schemaRef`.
    #[error("$schemaRef required in strict mode")]
    RefRequired,

    /// No filename token matched.
    #[error("no filename token match (expected one of: {})", token_list())]
    NoTokenMatch,
}

fn token_list() -> String {
    SCHEMA_TOKENS
        .iter()
        .map(|(token, _)| *token)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Pick the schema filename for `instance` read from `file_name`.
pub fn select_schema(
    file_name: &str,
    instance: &Value,
    store: &SchemaStore,
    strict: bool,
) -> Result<String, SelectionError> {
    if let Some(reference) = instance.get(SCHEMA_REF_KEY).and_then(Value::as_str) {
        let name = reference.rsplit('/').next().unwrap_or(reference);
        return if store.contains(name) {
            Ok(name.to_string())
        } else {
            Err(SelectionError::UnrecognizedRef(reference.to_string()))
        };
    }
    if strict {
        return Err(SelectionError::RefRequired);
    }
    let lowered = file_name.to_lowercase();
    SCHEMA_TOKENS
        .iter()
        .find(|(token, _)| lowered.contains(token))
        .map(|(_, schema)| schema.to_string())
        .ok_or(SelectionError::NoTokenMatch)
}

/// Validates example files against their claimed schemas, compiling each
/// schema at most once.
pub struct ExampleChecker<'s> {
    store: &'s SchemaStore,
    strict: bool,
    compiled: HashMap<String, Result<ExampleValidator, String>>,
}

impl<'s> ExampleChecker<'s> {
    /// Checker over `store`.
    pub fn new(store: &'s SchemaStore, strict: bool) -> Self {
        Self {
            store,
            strict,
            compiled: HashMap::new(),
        }
    }

    /// All findings for one example file, sorted.
    pub fn check_file(&mut self, path: &Path) -> Vec<ValidationIssue> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let instance: Value = match std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|text| serde_json::from_str(&text).map_err(|e| e.to_string()))
        {
            Ok(value) => value,
            Err(e) => return vec![ValidationIssue::file_level(format!("Invalid JSON: {e}"))],
        };

        let schema_name = match select_schema(&file_name, &instance, self.store, self.strict) {
            Ok(name) => name,
            Err(e) => {
                return vec![ValidationIssue::file_level(format!(
                    "could not determine schema: {e}"
                ))]
            }
        };

        let mut issues = check_envelope(&instance);
        match self.validator(&schema_name) {
            Ok(validator) => issues.extend(validator.validate(&instance)),
            Err(reason) => issues.push(ValidationIssue::file_level(reason.clone())),
        }
        issues.sort();
        issues
    }

    fn validator(&mut self, schema_name: &str) -> &Result<ExampleValidator, String> {
        let store = self.store;
        self.compiled
            .entry(schema_name.to_string())
            .or_insert_with(|| match store.get(schema_name) {
                Some(schema) => {
                    ExampleValidator::new(schema, store, schema_name).map_err(|e| e.to_string())
                }
                None => Err(format!("schema not found: {schema_name}")),
            })
    }
}
