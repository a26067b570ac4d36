//! # Normalize Subcommand
//!
//! Rewrites every `jsonschema/*.schema.json` into normalized form, or with
//! `--check` verifies that the files already are, without writing.
//!
//! Check mode fails when any file differs from its normalized form or an
//! optional property still carries an enum default.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use synschema_schema::{normalize_store, FileStatus, NormalizeMode, NormalizeOptions};

/// Arguments for the `synschema normalize` subcommand.
#[derive(Args, Debug)]
pub struct NormalizeArgs {
    /// Verify only: exit 1 if any file is not normalized or has optional enum defaults.
    #[arg(long)]
    pub check: bool,
}

/// Execute the normalize subcommand.
///
/// Returns exit code: 0 on success, 1 when the check fails.
pub fn run_normalize(args: &NormalizeArgs, repo_root: &Path) -> Result<u8> {
    let config = crate::load_config(repo_root)?;
    let options = NormalizeOptions::from_config(&config);
    let mode = if args.check {
        NormalizeMode::Check
    } else {
        NormalizeMode::Write
    };

    let report = normalize_store(&config.layout.schema_dir, &options, mode)
        .context("schema normalization failed")?;

    for (file, status) in &report.files {
        match status {
            FileStatus::Written => println!("normalized: {file}"),
            FileStatus::Unchanged => println!("ok: {file}"),
            FileStatus::NotNormalized => println!("not normalized: {file}"),
        }
    }

    for offense in report.offenses.iter().filter(|o| !o.is_blocking()) {
        println!("warning: {offense}");
    }

    let blocking: Vec<_> = report.blocking_offenses().collect();
    if mode == NormalizeMode::Check && !blocking.is_empty() {
        println!("Optional enum defaults found (disallowed):");
        for offense in &blocking {
            println!(" - {offense}");
        }
    }

    if !report.passed() {
        return Ok(1);
    }
    println!("done. files: {}", report.files.len());
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(root: &Path) {
        let dir = root.join("jsonschema");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(root.join("version.json"), r#"{"schemaVersion": "0.7.3"}"#).unwrap();
        std::fs::write(
            dir.join("control.schema.json"),
            r#"{"type":"object","properties":{"mode":{"enum":["a","b"],"default":"a"}}}"#,
        )
        .unwrap();
    }

    #[test]
    fn check_fails_until_written() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path());

        assert_eq!(run_normalize(&NormalizeArgs { check: true }, dir.path()).unwrap(), 1);
        assert_eq!(run_normalize(&NormalizeArgs { check: false }, dir.path()).unwrap(), 0);
        assert_eq!(run_normalize(&NormalizeArgs { check: true }, dir.path()).unwrap(), 0);

        let text = std::fs::read_to_string(dir.path().join("jsonschema/control.schema.json")).unwrap();
        assert!(text.contains("\"$id\": \"https://schemas.synesthetic.dev/0.7.3/control.schema.json\""));
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn missing_schema_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run_normalize(&NormalizeArgs { check: true }, dir.path()).is_err());
    }
}
