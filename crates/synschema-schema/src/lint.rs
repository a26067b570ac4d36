//! # Schema Lint
//!
//! Store-wide structural checks:
//!
//! - every document declaring an `$id` declares a unique one;
//! - every `$ref` resolves through [`SchemaStore::resolve`].
//!
//! Issues are returned sorted by file, then pointer, so output is stable.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use synschema_core::Walker;

use crate::store::SchemaStore;

/// One lint finding.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct LintIssue {
    /// Schema filename.
    pub file: String,
    /// JSON pointer to the object holding the problem.
    pub pointer: String,
    /// Human-readable message.
    pub message: String,
}

impl fmt::Display for LintIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.pointer.is_empty() {
            write!(f, "{}: {}", self.file, self.message)
        } else {
            write!(f, "{}: {}: {}", self.file, self.pointer, self.message)
        }
    }
}

/// Lint every document in the store.
pub fn lint(store: &SchemaStore) -> Vec<LintIssue> {
    let mut issues = Vec::new();
    let mut claimed: BTreeMap<&str, &str> = BTreeMap::new();

    for (file, document) in store.documents() {
        if let Some(id) = document.get("$id").and_then(Value::as_str) {
            match claimed.get(id) {
                Some(first) => issues.push(LintIssue {
                    file: file.to_string(),
                    pointer: "/$id".to_string(),
                    message: format!("duplicate $id {id} (first declared by {first})"),
                }),
                None => {
                    claimed.insert(id, file);
                }
            }
        }

        for (pointer, reference) in Walker::new(document).references() {
            if let Err(err) = store.resolve(file, reference) {
                issues.push(LintIssue {
                    file: file.to_string(),
                    pointer,
                    message: err.to_string(),
                });
            }
        }
    }

    tracing::debug!(documents = store.len(), issues = issues.len(), "lint finished");
    issues.sort();
    issues
}
