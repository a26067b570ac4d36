//! # Lint Subcommand
//!
//! Loads the schema store and reports duplicate `$id`s and unresolved
//! `$ref`s.

use std::path::Path;

use anyhow::{Context, Result};

use synschema_schema::{lint, SchemaStore};

/// Execute the lint subcommand.
///
/// Returns exit code: 0 when clean, 1 when any issue is found.
pub fn run_lint(repo_root: &Path) -> Result<u8> {
    let config = crate::load_config(repo_root)?;
    let store = SchemaStore::load(&config.layout.schema_dir, &config.base_url)
        .context("failed to load schema store")?;

    let issues = lint(&store);
    for issue in &issues {
        println!("{issue}");
    }
    if issues.is_empty() {
        println!("ok: {} schemas, no issues", store.len());
        Ok(0)
    } else {
        println!("{} issue(s) across {} schemas", issues.len(), store.len());
        Ok(1)
    }
}
