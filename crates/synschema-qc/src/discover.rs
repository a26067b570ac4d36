//! Spec discovery and example listing.

use std::path::{Path, PathBuf};

use synschema_core::files::relative_display;
use synschema_core::GovernanceError;

/// Locations checked, in order, for the canonical asset schema.
pub const CANONICAL_CANDIDATES: &[&str] = &[
    "schemas/synesthetic-asset.json",
    "schemas/synesthetic-asset.schema.json",
    "schemas/canonical/synesthetic-asset.json",
];

/// Repository-local fallback when no candidate exists.
pub const FALLBACK_CANONICAL: &str = "jsonschema/synesthetic-asset.schema.json";

/// First existing canonical schema under `root`, if any.
pub fn discover_spec(root: &Path) -> Option<PathBuf> {
    CANONICAL_CANDIDATES
        .iter()
        .chain(std::iter::once(&FALLBACK_CANONICAL))
        .map(|rel| root.join(rel))
        .find(|p| p.is_file())
}

/// Every `*.json` file under `dir`, recursively.
///
/// Directories whose name starts with `_` are skipped, as are symlinked
/// directories. With `prefix`, only
/// files whose name starts with it are kept. Results are ordered by their
/// `/`-separated path relative to `dir`.
pub fn list_examples(dir: &Path, prefix: Option<&str>) -> Result<Vec<PathBuf>, GovernanceError> {
    let mut out = Vec::new();
    collect(dir, prefix, &mut out)?;
    out.sort_by_cached_key(|p| relative_display(p, dir));
    Ok(out)
}

fn collect(dir: &Path, prefix: Option<&str>, out: &mut Vec<PathBuf>) -> Result<(), GovernanceError> {
    let io_err = |source| GovernanceError::Io {
        path: dir.display().to_string(),
        source,
    };
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let file_type = entry.file_type().map_err(io_err)?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if file_type.is_dir() {
            if !name.starts_with('_') {
                collect(&path, prefix, out)?;
            }
        } else if file_type.is_symlink() && path.is_dir() {
            tracing::debug!(path = %path.display(), "skipping symlinked directory");
        } else if name.ends_with(".json")
            && path.is_file()
            && prefix.map_or(true, |p| name.starts_with(p))
        {
            out.push(path);
        }
    }
    Ok(())
}
