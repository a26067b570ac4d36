//! # Pointers and Local References
//!
//! Builds JSON Pointer strings for error locations and field-presence keys,
//! and resolves same-document `$ref` values (`#/…`) to their target subtree.
//!
//! Resolution only steps through objects. A segment that names an array
//! index, or a missing key, yields `None`; the caller decides whether that is
//! an offense or simply nothing to do.

use std::fmt;

use serde_json::Value;

/// One step in a structural path: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathSegment {
    /// Object member name.
    Key(String),
    /// Array position.
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(k) => f.write_str(k),
            Self::Index(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(s: &str) -> Self {
        Self::Key(s.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(i: usize) -> Self {
        Self::Index(i)
    }
}

/// Escape one reference token per RFC 6901.
pub fn escape_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

fn unescape_token(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

/// Join path components into a JSON Pointer.
///
/// The empty path is the empty string (the document root), not `"/"`.
pub fn json_pointer<I>(parts: I) -> String
where
    I: IntoIterator,
    I::Item: fmt::Display,
{
    let mut out = String::new();
    for part in parts {
        out.push('/');
        out.push_str(&escape_token(&part.to_string()));
    }
    out
}

/// Resolve a same-document reference such as `#/$defs/Mode`.
///
/// `#` alone names the root. Any other form (anchors, external URLs)
/// returns `None`.
pub fn resolve_local_ref<'a>(root: &'a Value, reference: &str) -> Option<&'a Value> {
    if reference == "#" {
        return Some(root);
    }
    let path = reference.strip_prefix("#/")?;
    let mut current = root;
    for raw in path.split('/') {
        let key = unescape_token(raw);
        current = current.as_object()?.get(&key)?;
    }
    Some(current)
}

/// Resolve a local reference and return an independent deep copy.
///
/// The copy may be mutated freely; the definition inside `root` is never
/// touched.
pub fn resolve_local_ref_owned(root: &Value, reference: &str) -> Option<Value> {
    resolve_local_ref(root, reference).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_path_is_root_pointer() {
        let parts: Vec<PathSegment> = Vec::new();
        assert_eq!(json_pointer(parts), "");
    }

    #[test]
    fn pointer_escapes_tilde_and_slash() {
        let parts = vec![
            PathSegment::from("a/b"),
            PathSegment::from("c~d"),
            PathSegment::from(3usize),
        ];
        assert_eq!(json_pointer(parts), "/a~1b/c~0d/3");
    }

    #[test]
    fn resolves_defs_reference() {
        let doc = json!({"$defs": {"Mode": {"enum": ["a", "b"], "default": "a"}}});
        let target = resolve_local_ref(&doc, "#/$defs/Mode").unwrap();
        assert_eq!(target["default"], "a");
    }

    #[test]
    fn hash_alone_is_root() {
        let doc = json!({"type": "object"});
        assert_eq!(resolve_local_ref(&doc, "#"), Some(&doc));
    }

    #[test]
    fn missing_segment_is_none() {
        let doc = json!({"$defs": {}});
        assert!(resolve_local_ref(&doc, "#/$defs/Nope").is_none());
    }

    #[test]
    fn non_object_container_is_none() {
        let doc = json!({"items": [{"type": "string"}]});
        assert!(resolve_local_ref(&doc, "#/items/0").is_none());
    }

    #[test]
    fn external_reference_is_not_local() {
        let doc = json!({});
        assert!(resolve_local_ref(&doc, "https://example.org/x.schema.json").is_none());
        assert!(resolve_local_ref(&doc, "#anchor").is_none());
    }

    #[test]
    fn escaped_keys_resolve() {
        let doc = json!({"definitions": {"a/b": {"const": 1}}});
        assert_eq!(
            resolve_local_ref(&doc, "#/definitions/a~1b"),
            Some(&json!({"const": 1}))
        );
    }

    #[test]
    fn owned_copy_is_independent() {
        let doc = json!({"$defs": {"Mode": {"enum": ["a"], "default": "a"}}});
        let mut copy = resolve_local_ref_owned(&doc, "#/$defs/Mode").unwrap();
        copy.as_object_mut().unwrap().remove("default");
        assert_eq!(doc["$defs"]["Mode"]["default"], "a");
        assert!(copy.get("default").is_none());
    }
}
