//! # Schema Normalizer
//!
//! Pure rewrite `document -> normalized document` applied to every file in
//! the schema store. Per document:
//!
//! 1. Identity: `$schema` is the 2020-12 meta-schema, `$id` is
//!    `{base_url}/{version}/{filename}`, `x-schema-version` is the current
//!    version, `title` is the kebab-cased filename stem without `.schema`.
//! 2. The root `description` is dropped.
//! 3. The root `additionalProperties` defaults to `false` unless the file is
//!    on the allow-list. An explicit value is kept.
//! 4. Optional properties lose any `default` that is a member of their
//!    `enum`, inline or behind a same-document `$ref`. For the `$ref` case the
//!    property receives a private copy of the target with the default
//!    removed; the shared definition is left as authored. A definition
//!    that refers back to itself is never inlined, so its default remains
//!    and is reported as an offense.
//! 5. Absolute references under the base URL ending in `.schema.json` are
//!    re-pinned to the current version.
//!
//! Required-ness is evaluated per container from that container's own
//! `required` list; it is never inherited.
//!
//! Running [`normalize()`] on its own output changes nothing.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use serde_json::{Map, Value};
use thiserror::Error;

use synschema_core::config::META_SCHEMA_2020_12;
use synschema_core::files::{parse_json, read_text, write_text};
use synschema_core::walk::for_each_object_mut;
use synschema_core::{
    json_pointer, resolve_local_ref, resolve_local_ref_owned, to_canonical_string,
    GovernanceConfig, GovernanceError, PathSegment, SchemaVersion, Walker,
};

use crate::store::{schema_files, SCHEMA_SUFFIX};

/// Keywords whose values are subschemas (or lists of subschemas).
const COMPOSITION_KEYWORDS: &[&str] = &["allOf", "anyOf", "oneOf", "not", "if", "then", "else"];

/// Keywords holding named definition maps.
const DEFINITION_KEYWORDS: &[&str] = &["$defs", "definitions"];

/// Errors raised by the normalizer.
#[derive(Error, Debug)]
pub enum NormalizeError {
    /// The schema directory does not exist.
    #[error("schema directory not found: {0}")]
    MissingDirectory(String),

    /// A schema document is not a JSON object.
    #[error("{file}: document root must be a JSON object")]
    NotAnObject {
        /// The offending file.
        file: String,
    },

    /// Reading, parsing or writing a file failed.
    #[error(transparent)]
    File(#[from] GovernanceError),
}

/// File-independent normalization settings.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Canonical base URL, without trailing slash.
    pub base_url: String,
    /// Current schema version.
    pub version: SchemaVersion,
    /// Filenames that keep a permissive root.
    pub allow_additional_properties: BTreeSet<String>,
}

impl NormalizeOptions {
    /// Take settings from the run configuration.
    pub fn from_config(config: &GovernanceConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            version: config.version.clone(),
            allow_additional_properties: config.allow_additional_properties.clone(),
        }
    }
}

/// What the optional-enum-default check found.
#[derive(Debug, Clone, PartialEq)]
pub enum OffenseKind {
    /// An optional property still carries a default drawn from its enum.
    OptionalEnumDefault {
        /// The default value.
        default: Value,
        /// The enum's allowed values.
        allowed: Vec<Value>,
        /// The `$ref` the enum was reached through, if any.
        via: Option<String>,
    },
    /// An optional property's local `$ref` points nowhere.
    UnresolvedReference {
        /// The `$ref` value.
        reference: String,
    },
}

/// One finding from the optional-enum-default check.
#[derive(Debug, Clone, PartialEq)]
pub struct Offense {
    /// Schema filename.
    pub file: String,
    /// Pointer to the property schema.
    pub pointer: String,
    /// The finding.
    pub kind: OffenseKind,
}

impl Offense {
    /// True for findings that fail check mode.
    pub fn is_blocking(&self) -> bool {
        matches!(self.kind, OffenseKind::OptionalEnumDefault { .. })
    }
}

impl fmt::Display for Offense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            OffenseKind::OptionalEnumDefault {
                default,
                allowed,
                via,
            } => {
                write!(f, "{}: {}", self.file, self.pointer)?;
                if let Some(reference) = via {
                    write!(f, " ($ref -> {reference})")?;
                }
                let allowed = Value::Array(allowed.clone());
                write!(f, " (default={default}, enum={allowed})")
            }
            OffenseKind::UnresolvedReference { reference } => {
                write!(f, "{}: {} unresolved $ref {reference}", self.file, self.pointer)
            }
        }
    }
}

/// Output of [`normalize()`].
#[derive(Debug, Clone)]
pub struct Normalized {
    /// The rewritten document.
    pub document: Value,
    /// Optional-enum-default findings remaining after the rewrite.
    pub offenses: Vec<Offense>,
}

/// Normalize one schema document.
///
/// # Errors
///
/// Returns [`NormalizeError::NotAnObject`] when the root is not an object.
pub fn normalize(
    document: Value,
    file_name: &str,
    options: &NormalizeOptions,
) -> Result<Normalized, NormalizeError> {
    let Value::Object(mut root) = document else {
        return Err(NormalizeError::NotAnObject {
            file: file_name.to_string(),
        });
    };

    root.insert("$schema".into(), Value::from(META_SCHEMA_2020_12));
    root.insert(
        "$id".into(),
        Value::from(format!("{}/{}/{}", options.base_url, options.version, file_name)),
    );
    root.insert(
        "x-schema-version".into(),
        Value::from(options.version.as_str()),
    );
    root.remove("description");
    root.insert("title".into(), Value::from(title_for(file_name)));
    if !options.allow_additional_properties.contains(file_name) {
        root.entry("additionalProperties")
            .or_insert(Value::Bool(false));
    }

    let mut document = Value::Object(root);
    let snapshot = document.clone();
    strip_optional_enum_defaults(&snapshot, &mut document);
    rewrite_versioned_refs(&mut document, &options.base_url, &options.version);

    let offenses = find_offenses(&document, file_name);
    Ok(Normalized { document, offenses })
}

/// Kebab-case title derived from a schema filename.
///
/// `synesthetic-asset.schema.json` -> `synesthetic-asset`,
/// `RuleBundle.schema.json` -> `rule-bundle`.
pub fn title_for(file_name: &str) -> String {
    let stem = file_name.strip_suffix(".json").unwrap_or(file_name);
    let stem = stem.strip_suffix(".schema").unwrap_or(stem);
    kebab(stem)
}

fn kebab(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev: Option<char> = None;
    for c in name.chars() {
        if c.is_whitespace() || c == '_' {
            out.push('-');
        } else if c.is_uppercase() {
            if prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit()) {
                out.push('-');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
        prev = Some(c);
    }
    out
}

/// Remove `default` when it is one of the `enum` values. True if removed.
fn strip_enum_default(schema: &mut Map<String, Value>) -> bool {
    if enum_default(schema).is_some() {
        schema.remove("default");
        return true;
    }
    false
}

/// `(default, allowed)` when the schema has a default contained in its enum.
fn enum_default(schema: &Map<String, Value>) -> Option<(&Value, &Vec<Value>)> {
    let allowed = schema.get("enum")?.as_array()?;
    let default = schema.get("default")?;
    allowed.contains(default).then_some((default, allowed))
}

fn required_set(schema: &Map<String, Value>) -> BTreeSet<String> {
    schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| {
            names
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Recursive stripping pass. References resolve against `snapshot`, the
/// document as it stood before stripping, so shared definitions are read
/// but never written through.
fn strip_optional_enum_defaults(snapshot: &Value, node: &mut Value) {
    let Value::Object(map) = node else {
        return;
    };
    let required = required_set(map);

    if let Some(Value::Object(props)) = map.get_mut("properties") {
        for (name, prop) in props.iter_mut() {
            let Value::Object(prop_map) = &mut *prop else {
                continue;
            };
            if !required.contains(name) {
                strip_enum_default(prop_map);
                if let Some(inlined) = inline_stripped_target(snapshot, prop_map) {
                    *prop = inlined;
                }
            }
            strip_optional_enum_defaults(snapshot, prop);
        }
    }

    for_each_subschema_mut(map, |child| strip_optional_enum_defaults(snapshot, child));
}

/// Copy-on-strip: when the property's local `$ref` target carries an enum
/// default, return a private copy without it. Call-site keywords other than
/// `$ref` and `default` are kept on the copy.
fn inline_stripped_target(snapshot: &Value, prop: &Map<String, Value>) -> Option<Value> {
    let reference = prop.get("$ref")?.as_str()?;
    let Value::Object(mut target) = resolve_local_ref_owned(snapshot, reference)? else {
        return None;
    };
    if refers_back(snapshot, reference) {
        tracing::warn!(reference, "recursive definition left in place");
        return None;
    }
    if !strip_enum_default(&mut target) {
        return None;
    }
    for (key, value) in prop {
        if key != "$ref" && key != "default" {
            target.insert(key.clone(), value.clone());
        }
    }
    Some(Value::Object(target))
}

/// True when following same-document references from `reference`'s target
/// leads back to `reference`.
fn refers_back(snapshot: &Value, reference: &str) -> bool {
    let mut seen = BTreeSet::new();
    let mut pending = vec![reference.to_string()];
    while let Some(current) = pending.pop() {
        let Some(target) = resolve_local_ref(snapshot, &current) else {
            continue;
        };
        for (_, next) in Walker::new(target).references() {
            if !next.starts_with('#') {
                continue;
            }
            if next == reference {
                return true;
            }
            if seen.insert(next.to_string()) {
                pending.push(next.to_string());
            }
        }
    }
    false
}

/// Apply `f` to each subschema under definitions, `items`,
/// `additionalProperties` (when a schema) and the composition keywords.
fn for_each_subschema_mut<F>(map: &mut Map<String, Value>, mut f: F)
where
    F: FnMut(&mut Value),
{
    for key in DEFINITION_KEYWORDS {
        if let Some(Value::Object(defs)) = map.get_mut(*key) {
            defs.values_mut().for_each(&mut f);
        }
    }
    match map.get_mut("items") {
        Some(items @ Value::Object(_)) => f(items),
        Some(Value::Array(items)) => items.iter_mut().for_each(&mut f),
        _ => {}
    }
    if let Some(addl @ Value::Object(_)) = map.get_mut("additionalProperties") {
        f(addl);
    }
    for key in COMPOSITION_KEYWORDS {
        match map.get_mut(*key) {
            Some(child @ Value::Object(_)) => f(child),
            Some(Value::Array(children)) => children.iter_mut().for_each(&mut f),
            _ => {}
        }
    }
}

/// Subschemas with the path segments leading to them, read-only.
fn subschemas(map: &Map<String, Value>) -> Vec<(Vec<PathSegment>, &Value)> {
    let mut out = Vec::new();
    for key in DEFINITION_KEYWORDS {
        if let Some(Value::Object(defs)) = map.get(*key) {
            for (name, def) in defs {
                out.push((vec![PathSegment::from(*key), PathSegment::Key(name.clone())], def));
            }
        }
    }
    match map.get("items") {
        Some(items @ Value::Object(_)) => out.push((vec![PathSegment::from("items")], items)),
        Some(Value::Array(items)) => {
            for (i, item) in items.iter().enumerate() {
                out.push((vec![PathSegment::from("items"), PathSegment::Index(i)], item));
            }
        }
        _ => {}
    }
    if let Some(addl @ Value::Object(_)) = map.get("additionalProperties") {
        out.push((vec![PathSegment::from("additionalProperties")], addl));
    }
    for key in COMPOSITION_KEYWORDS {
        match map.get(*key) {
            Some(child @ Value::Object(_)) => out.push((vec![PathSegment::from(*key)], child)),
            Some(Value::Array(children)) => {
                for (i, child) in children.iter().enumerate() {
                    out.push((vec![PathSegment::from(*key), PathSegment::Index(i)], child));
                }
            }
            _ => {}
        }
    }
    out
}

/// Replace the version segment of every canonical absolute reference.
fn rewrite_versioned_refs(document: &mut Value, base_url: &str, version: &SchemaVersion) {
    let prefix = format!("{base_url}/");
    for_each_object_mut(document, &mut |map| {
        if let Some(Value::String(reference)) = map.get_mut("$ref") {
            if reference.starts_with(&prefix) && reference.ends_with(SCHEMA_SUFFIX) {
                let name = reference.rsplit('/').next().unwrap_or_default().to_string();
                *reference = format!("{base_url}/{version}/{name}");
            }
        }
    });
}

/// Report optional properties that still carry enum defaults.
pub fn find_offenses(document: &Value, file_name: &str) -> Vec<Offense> {
    let mut out = Vec::new();
    let mut path = Vec::new();
    collect_offenses(document, document, file_name, &mut path, &mut out);
    out
}

fn collect_offenses(
    root: &Value,
    node: &Value,
    file: &str,
    path: &mut Vec<PathSegment>,
    out: &mut Vec<Offense>,
) {
    let Value::Object(map) = node else {
        return;
    };
    let required = required_set(map);

    if let Some(Value::Object(props)) = map.get("properties") {
        for (name, prop) in props {
            let Value::Object(prop_map) = prop else {
                continue;
            };
            path.push(PathSegment::from("properties"));
            path.push(PathSegment::Key(name.clone()));
            let pointer = json_pointer(path.iter());

            if !required.contains(name) {
                if let Some((default, allowed)) = enum_default(prop_map) {
                    out.push(Offense {
                        file: file.to_string(),
                        pointer: pointer.clone(),
                        kind: OffenseKind::OptionalEnumDefault {
                            default: default.clone(),
                            allowed: allowed.clone(),
                            via: None,
                        },
                    });
                }
                if let Some(reference) = prop_map.get("$ref").and_then(Value::as_str) {
                    if reference.starts_with('#') {
                        match resolve_local_ref(root, reference) {
                            Some(Value::Object(target)) => {
                                if let Some((default, allowed)) = enum_default(target) {
                                    out.push(Offense {
                                        file: file.to_string(),
                                        pointer: pointer.clone(),
                                        kind: OffenseKind::OptionalEnumDefault {
                                            default: default.clone(),
                                            allowed: allowed.clone(),
                                            via: Some(reference.to_string()),
                                        },
                                    });
                                }
                            }
                            Some(_) => {}
                            None => out.push(Offense {
                                file: file.to_string(),
                                pointer: pointer.clone(),
                                kind: OffenseKind::UnresolvedReference {
                                    reference: reference.to_string(),
                                },
                            }),
                        }
                    }
                }
            }

            collect_offenses(root, prop, file, path, out);
            path.pop();
            path.pop();
        }
    }

    for (segments, child) in subschemas(map) {
        let depth = segments.len();
        path.extend(segments);
        collect_offenses(root, child, file, path, out);
        path.truncate(path.len() - depth);
    }
}

/// Whether [`normalize_store`] writes files or only verifies them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeMode {
    /// Rewrite files whose normalized form differs.
    Write,
    /// Never write; report drift and offenses.
    Check,
}

/// Per-file result of a directory sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    /// Write mode: the file was rewritten.
    Written,
    /// The on-disk bytes already matched the canonical normalized text.
    Unchanged,
    /// Check mode: the on-disk file differs from its normalized form.
    NotNormalized,
}

/// Result of normalizing a schema directory.
#[derive(Debug, Clone)]
pub struct NormalizeReport {
    /// The mode the sweep ran in.
    pub mode: NormalizeMode,
    /// `(filename, status)` in filename order.
    pub files: Vec<(String, FileStatus)>,
    /// Offense findings across all files.
    pub offenses: Vec<Offense>,
}

impl NormalizeReport {
    /// Files found not normalized (check mode only).
    pub fn not_normalized(&self) -> impl Iterator<Item = &str> {
        self.files
            .iter()
            .filter(|(_, s)| *s == FileStatus::NotNormalized)
            .map(|(f, _)| f.as_str())
    }

    /// Offenses that fail check mode.
    pub fn blocking_offenses(&self) -> impl Iterator<Item = &Offense> {
        self.offenses.iter().filter(|o| o.is_blocking())
    }

    /// True when check mode found nothing to fail on. Write mode always passes.
    pub fn passed(&self) -> bool {
        match self.mode {
            NormalizeMode::Write => true,
            NormalizeMode::Check => {
                self.not_normalized().next().is_none() && self.blocking_offenses().next().is_none()
            }
        }
    }
}

/// Normalize every `*.schema.json` in `schema_dir`.
///
/// A malformed file aborts the sweep with its path in the error.
pub fn normalize_store(
    schema_dir: &Path,
    options: &NormalizeOptions,
    mode: NormalizeMode,
) -> Result<NormalizeReport, NormalizeError> {
    if !schema_dir.is_dir() {
        return Err(NormalizeError::MissingDirectory(
            schema_dir.display().to_string(),
        ));
    }

    let mut report = NormalizeReport {
        mode,
        files: Vec::new(),
        offenses: Vec::new(),
    };

    for path in schema_files(schema_dir)? {
        let file_name = file_name_of(&path);
        let on_disk = read_text(&path)?;
        let normalized = normalize(parse_json(&path, &on_disk)?, &file_name, options)?;
        let text =
            to_canonical_string(&normalized.document).map_err(GovernanceError::Serialize)?;

        let status = if on_disk == text {
            FileStatus::Unchanged
        } else {
            match mode {
                NormalizeMode::Write => {
                    write_text(&path, &text)?;
                    FileStatus::Written
                }
                NormalizeMode::Check => FileStatus::NotNormalized,
            }
        };
        tracing::debug!(file = %file_name, ?status, "normalized schema");

        report.files.push((file_name, status));
        report.offenses.extend(normalized.offenses);
    }

    Ok(report)
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options() -> NormalizeOptions {
        NormalizeOptions {
            base_url: "https://schemas.synesthetic.dev".to_string(),
            version: SchemaVersion::new("0.7.3").unwrap(),
            allow_additional_properties: ["tone.schema.json".to_string()].into_iter().collect(),
        }
    }

    fn run(doc: Value, file: &str) -> Value {
        normalize(doc, file, &options()).unwrap().document
    }

    #[test]
    fn stamps_identity_metadata() {
        let out = run(json!({"description": "noise", "type": "object"}), "control-bundle.schema.json");
        assert_eq!(out["$schema"], META_SCHEMA_2020_12);
        assert_eq!(
            out["$id"],
            "https://schemas.synesthetic.dev/0.7.3/control-bundle.schema.json"
        );
        assert_eq!(out["x-schema-version"], "0.7.3");
        assert_eq!(out["title"], "control-bundle");
        assert!(out.get("description").is_none());
    }

    #[test]
    fn nested_descriptions_survive() {
        let out = run(
            json!({"properties": {"a": {"type": "string", "description": "kept"}}}),
            "x.schema.json",
        );
        assert_eq!(out["properties"]["a"]["description"], "kept");
    }

    #[test]
    fn titles_are_kebab_case() {
        assert_eq!(title_for("synesthetic-asset.schema.json"), "synesthetic-asset");
        assert_eq!(title_for("RuleBundle.schema.json"), "rule-bundle");
        assert_eq!(title_for("control bundle.schema.json"), "control-bundle");
        assert_eq!(title_for("shader_lib.schema.json"), "shader-lib");
    }

    #[test]
    fn additional_properties_defaults_false() {
        let out = run(json!({"type": "object"}), "control.schema.json");
        assert_eq!(out["additionalProperties"], false);
    }

    #[test]
    fn explicit_additional_properties_kept() {
        let out = run(json!({"additionalProperties": true}), "control.schema.json");
        assert_eq!(out["additionalProperties"], true);
    }

    #[test]
    fn allow_listed_file_left_as_authored() {
        let out = run(json!({"type": "object"}), "tone.schema.json");
        assert!(out.get("additionalProperties").is_none());
    }

    #[test]
    fn strips_inline_optional_enum_default() {
        let out = run(
            json!({
                "properties": {
                    "mode": {"type": "string", "enum": ["a", "b"], "default": "a"}
                }
            }),
            "x.schema.json",
        );
        assert!(out["properties"]["mode"].get("default").is_none());
        assert_eq!(out["properties"]["mode"]["enum"], json!(["a", "b"]));
    }

    #[test]
    fn required_property_keeps_default() {
        let out = run(
            json!({
                "required": ["mode"],
                "properties": {
                    "mode": {"enum": ["a", "b"], "default": "a"}
                }
            }),
            "x.schema.json",
        );
        assert_eq!(out["properties"]["mode"]["default"], "a");
    }

    #[test]
    fn default_outside_enum_kept() {
        let out = run(
            json!({"properties": {"mode": {"enum": ["a", "b"], "default": "z"}}}),
            "x.schema.json",
        );
        assert_eq!(out["properties"]["mode"]["default"], "z");
    }

    #[test]
    fn ref_default_inlined_without_touching_shared_def() {
        let out = run(
            json!({
                "$defs": {"Mode": {"type": "string", "enum": ["a", "b"], "default": "a"}},
                "required": ["strict"],
                "properties": {
                    "loose": {"$ref": "#/$defs/Mode", "description": "optional"},
                    "strict": {"$ref": "#/$defs/Mode"}
                }
            }),
            "x.schema.json",
        );
        let loose = &out["properties"]["loose"];
        assert!(loose.get("$ref").is_none());
        assert!(loose.get("default").is_none());
        assert_eq!(loose["enum"], json!(["a", "b"]));
        assert_eq!(loose["description"], "optional");
        assert_eq!(out["properties"]["strict"], json!({"$ref": "#/$defs/Mode"}));
        assert_eq!(out["$defs"]["Mode"]["default"], "a");
    }

    #[test]
    fn required_is_not_inherited() {
        let out = run(
            json!({
                "required": ["inner"],
                "properties": {
                    "inner": {
                        "type": "object",
                        "properties": {
                            "inner": {"enum": [1, 2], "default": 1}
                        }
                    }
                }
            }),
            "x.schema.json",
        );
        assert!(out["properties"]["inner"]["properties"]["inner"]
            .get("default")
            .is_none());
    }

    #[test]
    fn recurses_through_composition_and_items() {
        let out = run(
            json!({
                "$defs": {"Obj": {"properties": {"a": {"enum": ["x"], "default": "x"}}}},
                "items": [{"properties": {"b": {"enum": [true], "default": true}}}],
                "additionalProperties": {"properties": {"c": {"enum": [0], "default": 0}}},
                "anyOf": [{"properties": {"d": {"enum": ["y"], "default": "y"}}}],
                "not": {"properties": {"e": {"enum": ["z"], "default": "z"}}},
                "then": {"items": {"properties": {"f": {"enum": [null], "default": null}}}}
            }),
            "x.schema.json",
        );
        assert!(out["$defs"]["Obj"]["properties"]["a"].get("default").is_none());
        assert!(out["items"][0]["properties"]["b"].get("default").is_none());
        assert!(out["additionalProperties"]["properties"]["c"].get("default").is_none());
        assert!(out["anyOf"][0]["properties"]["d"].get("default").is_none());
        assert!(out["not"]["properties"]["e"].get("default").is_none());
        assert!(out["then"]["items"]["properties"]["f"].get("default").is_none());
    }

    #[test]
    fn rewrites_absolute_refs_to_current_version() {
        let out = run(
            json!({
                "properties": {
                    "tone": {"$ref": "https://schemas.synesthetic.dev/0.1.0/tone.schema.json"},
                    "other": {"$ref": "https://example.org/0.1.0/tone.schema.json"},
                    "local": {"$ref": "#/$defs/X"}
                },
                "$defs": {"X": {"type": "string"}}
            }),
            "x.schema.json",
        );
        assert_eq!(
            out["properties"]["tone"]["$ref"],
            "https://schemas.synesthetic.dev/0.7.3/tone.schema.json"
        );
        assert_eq!(
            out["properties"]["other"]["$ref"],
            "https://example.org/0.1.0/tone.schema.json"
        );
        assert_eq!(out["properties"]["local"]["$ref"], "#/$defs/X");
    }

    #[test]
    fn non_object_root_is_error() {
        let err = normalize(json!([1, 2]), "x.schema.json", &options()).unwrap_err();
        assert!(matches!(err, NormalizeError::NotAnObject { .. }));
    }

    #[test]
    fn offenses_report_ref_enum_defaults_on_unnormalized_docs() {
        let doc = json!({
            "$defs": {"Mode": {"enum": ["a"], "default": "a"}},
            "properties": {
                "m": {"$ref": "#/$defs/Mode"},
                "n": {"enum": [1], "default": 1},
                "broken": {"$ref": "#/$defs/Missing"}
            }
        });
        let offenses = find_offenses(&doc, "x.schema.json");
        assert_eq!(offenses.len(), 3);
        assert!(offenses.iter().any(|o| o.pointer == "/properties/m"
            && matches!(&o.kind, OffenseKind::OptionalEnumDefault { via: Some(r), .. } if r == "#/$defs/Mode")));
        assert!(offenses.iter().any(|o| o.pointer == "/properties/n" && o.is_blocking()));
        assert!(offenses.iter().any(|o| o.pointer == "/properties/broken" && !o.is_blocking()));
    }

    #[test]
    fn normalized_output_has_no_blocking_offenses() {
        let normalized = normalize(
            json!({
                "$defs": {"Mode": {"enum": ["a"], "default": "a"}},
                "properties": {"m": {"$ref": "#/$defs/Mode"}}
            }),
            "x.schema.json",
            &options(),
        )
        .unwrap();
        assert!(normalized.offenses.iter().all(|o| !o.is_blocking()));
    }

    #[test]
    fn offense_display_mentions_default_and_enum() {
        let o = Offense {
            file: "x.schema.json".into(),
            pointer: "/properties/m".into(),
            kind: OffenseKind::OptionalEnumDefault {
                default: json!("a"),
                allowed: vec![json!("a"), json!("b")],
                via: None,
            },
        };
        assert_eq!(
            o.to_string(),
            r#"x.schema.json: /properties/m (default="a", enum=["a","b"])"#
        );
    }

    #[test]
    fn self_referential_definition_is_reported_not_inlined() {
        let doc = json!({
            "type": "object",
            "$defs": {
                "Node": {
                    "type": "object",
                    "enum": [{}],
                    "default": {},
                    "properties": {"next": {"$ref": "#/$defs/Node"}}
                }
            },
            "properties": {"head": {"$ref": "#/$defs/Node"}}
        });
        let out = normalize(doc, "list.schema.json", &options()).unwrap();
        assert_eq!(out.document["properties"]["head"], json!({"$ref": "#/$defs/Node"}));
        let blocking: Vec<&str> = out
            .offenses
            .iter()
            .filter(|o| o.is_blocking())
            .map(|o| o.pointer.as_str())
            .collect();
        assert_eq!(blocking, vec!["/properties/head", "/$defs/Node/properties/next"]);

        let again = normalize(out.document.clone(), "list.schema.json", &options()).unwrap();
        assert_eq!(again.document, out.document);
    }

    #[test]
    fn mutually_recursive_definitions_terminate() {
        let doc = json!({
            "$defs": {
                "A": {"enum": [1], "default": 1, "properties": {"b": {"$ref": "#/$defs/B"}}},
                "B": {"enum": [2], "default": 2, "properties": {"a": {"$ref": "#/$defs/A"}}},
                "Leaf": {"enum": ["x"], "default": "x", "properties": {"b": {"$ref": "#/$defs/B"}}}
            },
            "properties": {"leaf": {"$ref": "#/$defs/Leaf"}}
        });
        let out = normalize(doc, "cycle.schema.json", &options()).unwrap();
        let leaf = &out.document["properties"]["leaf"];
        assert!(leaf.get("default").is_none());
        assert_eq!(leaf["properties"]["b"], json!({"$ref": "#/$defs/B"}));
    }
}
