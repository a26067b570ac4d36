//! # Run Configuration
//!
//! [`GovernanceConfig`] is built once per invocation and threaded through
//! every component: the normalizer stamps `$id`s with its version and base
//! URL, the store resolves absolute references against the same base, and
//! the certification pipeline takes its file layout from [`RepoLayout`].
//!
//! ## Sources
//!
//! - `version.json` at the repository root: `{"schemaVersion": "0.7.3"}`.
//!   Missing file means [`DEFAULT_SCHEMA_VERSION`].
//! - `SYNSCHEMA_VERSION` overrides the version.
//! - `SYNSCHEMA_BASE_URL` overrides [`DEFAULT_BASE_URL`].

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::ConfigError;

/// Canonical host under which schema `$id`s are published.
pub const DEFAULT_BASE_URL: &str = "https://schemas.synesthetic.dev";

/// Version used when the repository has no `version.json`.
pub const DEFAULT_SCHEMA_VERSION: &str = "0.1.0";

/// The JSON Schema meta-schema every document declares.
pub const META_SCHEMA_2020_12: &str = "https://json-schema.org/draft/2020-12/schema";

/// Documents allowed to stay permissive (`additionalProperties`) at the root.
pub const ROOT_ALLOW_ADDITIONAL_PROPERTIES: &[&str] = &["tone.schema.json", "haptic.schema.json"];

/// Name of the version file at the repository root.
pub const VERSION_FILE: &str = "version.json";

/// Environment variable overriding the schema version.
pub const ENV_VERSION: &str = "SYNSCHEMA_VERSION";

/// Environment variable overriding the canonical base URL.
pub const ENV_BASE_URL: &str = "SYNSCHEMA_BASE_URL";

/// A schema version token, used verbatim as a URL path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaVersion(String);

impl SchemaVersion {
    /// Validate and wrap a version token.
    pub fn new(s: impl Into<String>) -> Result<Self, ConfigError> {
        let s = s.into();
        if s.is_empty() || s.contains('/') || s.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidVersion(s));
        }
        Ok(Self(s))
    }

    /// The raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where things live inside a schemas repository.
#[derive(Debug, Clone)]
pub struct RepoLayout {
    /// Repository root; every other path is under it.
    pub root: PathBuf,
    /// Directory of `*.schema.json` documents.
    pub schema_dir: PathBuf,
    /// Root of the example instance tree.
    pub examples_dir: PathBuf,
    /// Directory receiving QC reports.
    pub output_dir: PathBuf,
    /// Where a synthesized draft schema is written.
    pub draft_schema_path: PathBuf,
    /// Where the draft specification note is written.
    pub draft_spec_path: PathBuf,
}

impl RepoLayout {
    /// The standard layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            schema_dir: root.join("jsonschema"),
            examples_dir: root.join("examples"),
            output_dir: root.join("meta").join("output"),
            draft_schema_path: root
                .join("schemas")
                .join("_draft")
                .join("synesthetic-asset.generated.json"),
            draft_spec_path: root
                .join("docs")
                .join("specs")
                .join("SynestheticAsset_SPEC.md"),
            root,
        }
    }

    /// Machine-readable QC report.
    pub fn report_json(&self) -> PathBuf {
        self.output_dir.join("SCHEMAS_EXAMPLES_QA.json")
    }

    /// Markdown rendering of the QC report.
    pub fn report_markdown(&self) -> PathBuf {
        self.output_dir.join("SCHEMAS_EXAMPLES_QA.md")
    }

    /// Flat list of blessed `(file, name)` pairs.
    pub fn blessed_index(&self) -> PathBuf {
        self.output_dir.join("BLESSED_EXAMPLES.json")
    }

    /// Field presence matrix.
    pub fn field_matrix(&self) -> PathBuf {
        self.output_dir.join("EXAMPLE_FIELD_MATRIX.json")
    }
}

/// Per-run context shared by every governance component.
#[derive(Debug, Clone)]
pub struct GovernanceConfig {
    /// Current schema version.
    pub version: SchemaVersion,
    /// Canonical base URL, without a trailing slash.
    pub base_url: String,
    /// Repository layout.
    pub layout: RepoLayout,
    /// Schema filenames exempt from the root `additionalProperties: false` rule.
    pub allow_additional_properties: BTreeSet<String>,
}

impl GovernanceConfig {
    /// Build a config with an explicit version and the default base URL.
    pub fn new(root: impl Into<PathBuf>, version: SchemaVersion) -> Self {
        Self {
            version,
            base_url: DEFAULT_BASE_URL.to_string(),
            layout: RepoLayout::new(root),
            allow_additional_properties: ROOT_ALLOW_ADDITIONAL_PROPERTIES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Load from `version.json` under `root` and the process environment.
    pub fn load(root: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        Self::load_with_env(root, |key| std::env::var(key).ok())
    }

    /// Load with an injectable environment lookup.
    pub fn load_with_env<F>(root: impl Into<PathBuf>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let root = root.into();
        let version = match env(ENV_VERSION) {
            Some(v) => SchemaVersion::new(v)?,
            None => read_schema_version(&root.join(VERSION_FILE))?
                .unwrap_or_else(|| SchemaVersion(DEFAULT_SCHEMA_VERSION.to_string())),
        };
        let mut config = Self::new(root, version);
        if let Some(url) = env(ENV_BASE_URL) {
            config.base_url = validate_base_url(&url)?;
        }
        Ok(config)
    }

    /// The `$id` a schema file receives at the current version.
    pub fn schema_id(&self, file_name: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.version, file_name)
    }

    /// True when `file_name` may keep a permissive root.
    pub fn allows_additional_properties(&self, file_name: &str) -> bool {
        self.allow_additional_properties.contains(file_name)
    }
}

/// Read `schemaVersion` from a version file.
///
/// `Ok(None)` when the file does not exist.
pub fn read_schema_version(path: &Path) -> Result<Option<SchemaVersion>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let malformed = |reason: String| ConfigError::MalformedVersionFile {
        path: path.display().to_string(),
        reason,
    };
    let text = std::fs::read_to_string(path).map_err(|e| malformed(e.to_string()))?;
    let data: Value = serde_json::from_str(&text).map_err(|e| malformed(e.to_string()))?;
    match data.get("schemaVersion").and_then(Value::as_str) {
        Some(v) if !v.is_empty() => SchemaVersion::new(v).map(Some),
        _ => Err(malformed("missing 'schemaVersion' string".to_string())),
    }
}

fn validate_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim_end_matches('/');
    let rest = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"));
    match rest {
        Some(host) if !host.is_empty() => Ok(trimmed.to_string()),
        _ => Err(ConfigError::InvalidBaseUrl(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn version_rejects_slash_and_blank() {
        assert!(SchemaVersion::new("0.7.3").is_ok());
        assert!(SchemaVersion::new("").is_err());
        assert!(SchemaVersion::new("0.7/3").is_err());
        assert!(SchemaVersion::new("0.7 3").is_err());
    }

    #[test]
    fn missing_version_file_uses_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = GovernanceConfig::load_with_env(dir.path(), no_env).unwrap();
        assert_eq!(cfg.version.as_str(), DEFAULT_SCHEMA_VERSION);
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn reads_version_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(VERSION_FILE), r#"{"schemaVersion": "0.7.3"}"#).unwrap();
        let cfg = GovernanceConfig::load_with_env(dir.path(), no_env).unwrap();
        assert_eq!(cfg.version.as_str(), "0.7.3");
        assert_eq!(
            cfg.schema_id("tone.schema.json"),
            "https://schemas.synesthetic.dev/0.7.3/tone.schema.json"
        );
    }

    #[test]
    fn version_file_without_key_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(VERSION_FILE), r#"{"version": "0.7.3"}"#).unwrap();
        let err = GovernanceConfig::load_with_env(dir.path(), no_env).unwrap_err();
        assert!(matches!(err, ConfigError::MalformedVersionFile { .. }));
    }

    #[test]
    fn environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(VERSION_FILE), r#"{"schemaVersion": "0.7.3"}"#).unwrap();
        let cfg = GovernanceConfig::load_with_env(dir.path(), |key| match key {
            ENV_VERSION => Some("1.0.0".to_string()),
            ENV_BASE_URL => Some("https://example.org/schemas/".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(cfg.version.as_str(), "1.0.0");
        assert_eq!(cfg.base_url, "https://example.org/schemas");
    }

    #[test]
    fn rejects_non_http_base_url() {
        let dir = tempfile::tempdir().unwrap();
        let err = GovernanceConfig::load_with_env(dir.path(), |key| {
            (key == ENV_BASE_URL).then(|| "ftp://example.org".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl(_)));
    }

    #[test]
    fn default_allow_list() {
        let cfg = GovernanceConfig::new("/repo", SchemaVersion::new("0.1.0").unwrap());
        assert!(cfg.allows_additional_properties("tone.schema.json"));
        assert!(cfg.allows_additional_properties("haptic.schema.json"));
        assert!(!cfg.allows_additional_properties("control.schema.json"));
    }

    #[test]
    fn layout_paths_are_under_root() {
        let layout = RepoLayout::new("/repo");
        assert_eq!(layout.schema_dir, Path::new("/repo/jsonschema"));
        assert_eq!(
            layout.report_json(),
            Path::new("/repo/meta/output/SCHEMAS_EXAMPLES_QA.json")
        );
        assert_eq!(
            layout.draft_schema_path,
            Path::new("/repo/schemas/_draft/synesthetic-asset.generated.json")
        );
    }
}
