//! File helpers for JSON documents and text artifacts.
//!
//! Parent directories are created on write. Paths shown in reports are
//! repository-relative with `/` separators regardless of platform.

use std::path::Path;

use serde_json::Value;

use crate::canonical::to_canonical_string;
use crate::error::GovernanceError;

/// Read a text file.
pub fn read_text(path: &Path) -> Result<String, GovernanceError> {
    std::fs::read_to_string(path).map_err(|source| GovernanceError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Parse JSON text read from `path`.
pub fn parse_json(path: &Path, text: &str) -> Result<Value, GovernanceError> {
    serde_json::from_str(text).map_err(|source| GovernanceError::Json {
        path: path.display().to_string(),
        source,
    })
}

/// Read and parse a JSON file.
pub fn read_json(path: &Path) -> Result<Value, GovernanceError> {
    parse_json(path, &read_text(path)?)
}

/// Write `value` in canonical form (sorted keys, trailing newline).
pub fn write_json(path: &Path, value: &Value) -> Result<(), GovernanceError> {
    let text = to_canonical_string(value).map_err(GovernanceError::Serialize)?;
    write_text(path, &text)
}

/// Write a text artifact.
pub fn write_text(path: &Path, text: &str) -> Result<(), GovernanceError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|source| GovernanceError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }
    }
    std::fs::write(path, text).map_err(|source| GovernanceError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Display `path` relative to `root` using `/` separators.
///
/// Paths outside `root` are shown as given.
pub fn relative_display(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
