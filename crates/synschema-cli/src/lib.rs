//! # synschema-cli — Governance CLI for synesthetic-schemas
//!
//! Provides the `synschema` command-line interface over the schema store
//! and the example corpus.
//!
//! ## Subcommands
//!
//! - `synschema normalize [--check]`: rewrite or verify normalized schemas.
//! - `synschema lint`: `$id` uniqueness and `$ref` resolution.
//! - `synschema validate [--file F | --dir D] [--strict]`: validate examples
//!   against the schema each one claims.
//! - `synschema qc [--print] [--fail-fast] [--prefix P]`: the examples QA gate.
//!
//! ## Exit codes
//!
//! | Command | Clean | Findings | Setup failure |
//! |---------|-------|----------|---------------|
//! | `normalize` | 0 | 1 | 2 |
//! | `lint` | 0 | 1 | 2 |
//! | `validate` | 0 | 1 | 2 |
//! | `qc` | 0 | 2 | 3 |

pub mod lint;
pub mod normalize;
pub mod qc;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use synschema_core::config::VERSION_FILE;
use synschema_core::GovernanceConfig;

/// Resolve a path that may be relative to the repository root.
///
/// Absolute paths are returned as-is. A relative path that exists under
/// `repo_root` is taken from there; otherwise it is left relative to the
/// current directory.
pub fn resolve_path(path: &Path, repo_root: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    let repo_relative = repo_root.join(path);
    if repo_relative.exists() {
        repo_relative
    } else {
        path.to_path_buf()
    }
}

/// Walk up from `start` to the first directory holding `version.json` or
/// `jsonschema/`.
pub fn find_repo_root(start: &Path) -> Option<PathBuf> {
    let mut dir = start;
    loop {
        if dir.join(VERSION_FILE).is_file() || dir.join("jsonschema").is_dir() {
            return Some(dir.to_path_buf());
        }
        dir = dir.parent()?;
    }
}

/// Load the run configuration for `repo_root`.
pub fn load_config(repo_root: &Path) -> Result<GovernanceConfig> {
    GovernanceConfig::load(repo_root)
        .with_context(|| format!("failed to load configuration under {}", repo_root.display()))
}

/// The subcommand a handler result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// `synschema normalize`
    Normalize,
    /// `synschema lint`
    Lint,
    /// `synschema validate`
    Validate,
    /// `synschema qc`
    Qc,
}

impl CommandKind {
    /// Exit code for a run that could not complete.
    pub fn setup_failure_code(self) -> u8 {
        match self {
            Self::Qc => 3,
            Self::Normalize | Self::Lint | Self::Validate => 2,
        }
    }
}

/// Map a handler result to the process exit code. Errors are logged and
/// become the subcommand's setup-failure code.
pub fn exit_code(kind: CommandKind, result: Result<u8>) -> u8 {
    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            kind.setup_failure_code()
        }
    }
}
