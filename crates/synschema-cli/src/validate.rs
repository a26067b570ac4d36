//! # Validate Subcommand
//!
//! Validates example files against the schema each one claims: the
//! top-level `$schemaRef` first, then (unless `--strict`) filename tokens.
//! Every file also gets the envelope check.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use synschema_core::files::relative_display;
use synschema_qc::{list_examples, ExampleChecker};
use synschema_schema::SchemaStore;

/// Arguments for the `synschema validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Validate a single file.
    #[arg(long, value_name = "PATH", conflicts_with = "dir")]
    pub file: Option<PathBuf>,

    /// Validate all *.json under a directory (recursively). Defaults to examples/.
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Require $schemaRef; disable filename heuristics.
    #[arg(long)]
    pub strict: bool,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 when every file is clean, 1 on any finding.
pub fn run_validate(args: &ValidateArgs, repo_root: &Path) -> Result<u8> {
    let config = crate::load_config(repo_root)?;
    let files = gather_files(args, repo_root, &config.layout.examples_dir)?;
    if files.is_empty() {
        bail!("no example JSON files found");
    }

    let store = SchemaStore::load(&config.layout.schema_dir, &config.base_url)
        .context("failed to load schema store")?;
    let mut checker = ExampleChecker::new(&store, args.strict);

    let mut total_issues = 0usize;
    for path in &files {
        let issues = checker.check_file(path);
        if issues.is_empty() {
            continue;
        }
        let rel = relative_display(path, repo_root);
        for issue in &issues {
            println!("{rel}: {issue}");
        }
        total_issues += issues.len();
    }

    if total_issues > 0 {
        println!("{total_issues} issue(s) across {} file(s).", files.len());
        return Ok(1);
    }
    println!("{} example file(s) validated clean.", files.len());
    Ok(0)
}

fn gather_files(args: &ValidateArgs, repo_root: &Path, examples_dir: &Path) -> Result<Vec<PathBuf>> {
    if let Some(file) = &args.file {
        let path = crate::resolve_path(file, repo_root);
        if !path.is_file() {
            bail!("path not found: {}", path.display());
        }
        return Ok(vec![path]);
    }
    let dir = match &args.dir {
        Some(dir) => crate::resolve_path(dir, repo_root),
        None => examples_dir.to_path_buf(),
    };
    if !dir.is_dir() {
        bail!("path not found: {}", dir.display());
    }
    list_examples(&dir, None).with_context(|| format!("failed to list {}", dir.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(root: &Path) {
        let schemas = root.join("jsonschema");
        std::fs::create_dir_all(&schemas).unwrap();
        std::fs::write(
            schemas.join("tone.schema.json"),
            r#"{
                "$schema": "https://json-schema.org/draft/2020-12/schema",
                "$id": "https://schemas.synesthetic.dev/0.7.3/tone.schema.json",
                "type": "object",
                "required": ["engine"]
            }"#,
        )
        .unwrap();
        std::fs::create_dir_all(root.join("examples/_skip")).unwrap();
        std::fs::write(root.join("examples/_skip/Tone_bad.json"), "{}").unwrap();
    }

    fn args(file: Option<&str>, strict: bool) -> ValidateArgs {
        ValidateArgs {
            file: file.map(PathBuf::from),
            dir: None,
            strict,
        }
    }

    #[test]
    fn token_and_schema_ref_selection() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path());
        std::fs::write(dir.path().join("examples/Tone_Example.json"), r#"{"engine":"fm"}"#).unwrap();
        assert_eq!(run_validate(&args(None, false), dir.path()).unwrap(), 0);
        assert_eq!(run_validate(&args(None, true), dir.path()).unwrap(), 1);

        std::fs::write(
            dir.path().join("examples/Tone_Example.json"),
            r#"{"$schemaRef":"https://schemas.synesthetic.dev/0.7.3/tone.schema.json","engine":"fm"}"#,
        )
        .unwrap();
        assert_eq!(run_validate(&args(None, true), dir.path()).unwrap(), 0);
    }

    #[test]
    fn single_file_failure() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path());
        std::fs::write(dir.path().join("examples/tone_missing.json"), r#"{"id": 1}"#).unwrap();
        let code = run_validate(&args(Some("examples/tone_missing.json"), false), dir.path()).unwrap();
        assert_eq!(code, 1);
    }

    #[test]
    fn nothing_to_validate_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path());
        assert!(run_validate(&args(None, false), dir.path()).is_err());
        assert!(run_validate(&args(Some("examples/absent.json"), false), dir.path()).is_err());
    }
}
