//! # Draft Schema Synthesis
//!
//! When the repository has no canonical asset schema, a minimal permissive
//! one is derived from the example corpus so the sweep still runs:
//! any object, with `name` a non-empty string, and `name` required only if
//! every parsed example carries one.

use serde_json::{json, Value};

use synschema_core::config::META_SCHEMA_2020_12;

use crate::matrix::FieldMatrix;

/// `$id` of the synthesized schema.
pub const DRAFT_SCHEMA_ID: &str =
    "https://synesthetic.dev/schemas/_draft/synesthetic-asset.generated.json";

/// Title of the synthesized schema.
pub const DRAFT_TITLE: &str = "synesthetic-asset (DRAFT)";

/// True when `instance` has a `name` string that is not blank.
pub fn has_name(instance: &Value) -> bool {
    instance
        .get("name")
        .and_then(Value::as_str)
        .is_some_and(|n| !n.trim().is_empty())
}

/// Synthesize the draft schema from parsed examples.
///
/// An empty corpus requires `name`.
pub fn synthesize_draft<'a, I>(instances: I) -> Value
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut all_named = true;
    for instance in instances {
        all_named &= has_name(instance);
    }
    let required: Vec<&str> = if all_named { vec!["name"] } else { Vec::new() };

    json!({
        "$schema": META_SCHEMA_2020_12,
        "$id": DRAFT_SCHEMA_ID,
        "title": DRAFT_TITLE,
        "type": "object",
        "additionalProperties": true,
        "required": required,
        "properties": {
            "name": {"type": "string", "minLength": 1}
        },
        "x-generated-from": "examples",
    })
}

/// Markdown note written beside the draft schema.
pub fn draft_note(matrix: &FieldMatrix) -> String {
    let mut note = format!(
        "# SynestheticAsset Spec (DRAFT)\n\n\
         This draft is generated deterministically from examples.\n\n\
         - $schema: {META_SCHEMA_2020_12}\n\
         - $id: {DRAFT_SCHEMA_ID}\n\n\
         Required fields (heuristic):\n\n"
    );
    if matrix.contains_key("/name") {
        note.push_str("- name: string (required if present in all examples)\n");
    }
    note
}
