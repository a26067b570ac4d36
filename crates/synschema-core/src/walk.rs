//! # Tree Walker
//!
//! Generic recursive traversal of a JSON value. Object members are visited
//! in sorted key order and array items in index order, so anything built
//! from a walk (field matrices, reference listings) is deterministic no
//! matter how the source document was ordered.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::pointer::{json_pointer, PathSegment};

/// The six JSON value kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// `null`
    Null,
    /// `true` / `false`
    Boolean,
    /// Integer or floating point number.
    Number,
    /// UTF-8 string.
    String,
    /// Ordered list.
    Array,
    /// Keyed map.
    Object,
}

impl ValueKind {
    /// Classify a value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    /// Lowercase name as used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pre-order walker over a borrowed JSON tree.
///
/// The visitor receives the path from the root and the node at that path.
/// The root itself is visited with an empty path.
pub struct Walker<'a> {
    root: &'a Value,
}

impl<'a> Walker<'a> {
    /// Walk `root`.
    pub fn new(root: &'a Value) -> Self {
        Self { root }
    }

    /// Visit every node.
    pub fn visit<F>(&self, mut visitor: F)
    where
        F: FnMut(&[PathSegment], &'a Value),
    {
        let mut path = Vec::new();
        visit_node(self.root, &mut path, &mut visitor);
    }

    /// Every `$ref` string in the tree as `(pointer to the owning object, reference)`.
    ///
    /// Instance data under [`DATA_KEYWORDS`] is not searched. Members of
    /// name maps such as `properties` are schemas even when a member is
    /// called `default` or `enum`.
    pub fn references(&self) -> Vec<(String, &'a str)> {
        let mut out = Vec::new();
        let mut path = Vec::new();
        collect_references(self.root, false, &mut path, &mut out);
        out
    }
}

/// Keywords whose values are instance data, not subschemas.
pub const DATA_KEYWORDS: &[&str] = &["const", "default", "enum", "examples"];

/// Keywords whose values map arbitrary names to subschemas.
const NAME_MAP_KEYWORDS: &[&str] = &[
    "$defs",
    "definitions",
    "dependentSchemas",
    "patternProperties",
    "properties",
];

fn collect_references<'a>(
    node: &'a Value,
    name_map: bool,
    path: &mut Vec<PathSegment>,
    out: &mut Vec<(String, &'a str)>,
) {
    match node {
        Value::Object(map) => {
            if !name_map {
                if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
                    out.push((json_pointer(path.iter()), reference));
                }
            }
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for key in keys {
                if !name_map && DATA_KEYWORDS.contains(&key.as_str()) {
                    continue;
                }
                let child_is_name_map = !name_map && NAME_MAP_KEYWORDS.contains(&key.as_str());
                path.push(PathSegment::Key(key.clone()));
                collect_references(&map[key.as_str()], child_is_name_map, path, out);
                path.pop();
            }
        }
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                path.push(PathSegment::Index(i));
                collect_references(item, false, path, out);
                path.pop();
            }
        }
        _ => {}
    }
}

fn visit_node<'a, F>(node: &'a Value, path: &mut Vec<PathSegment>, visitor: &mut F)
where
    F: FnMut(&[PathSegment], &'a Value),
{
    visitor(path, node);
    match node {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for key in keys {
                path.push(PathSegment::Key(key.clone()));
                visit_node(&map[key.as_str()], path, visitor);
                path.pop();
            }
        }
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                path.push(PathSegment::Index(i));
                visit_node(item, path, visitor);
                path.pop();
            }
        }
        _ => {}
    }
}

/// Apply `f` to every object in the tree, parents before children.
pub fn for_each_object_mut<F>(value: &mut Value, f: &mut F)
where
    F: FnMut(&mut Map<String, Value>),
{
    match value {
        Value::Object(map) => {
            f(map);
            for child in map.values_mut() {
                for_each_object_mut(child, f);
            }
        }
        Value::Array(items) => {
            for child in items {
                for_each_object_mut(child, f);
            }
        }
        _ => {}
    }
}
