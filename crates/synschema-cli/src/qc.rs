//! # QC Subcommand
//!
//! Runs the examples certification gate and writes its reports under
//! `meta/output/`. Prints nothing unless `--print` is given; the exit code
//! carries the result.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use synschema_core::files::relative_display;
use synschema_core::to_canonical_string;
use synschema_qc::{run_qc, QcOptions};

/// Arguments for the `synschema qc` subcommand.
#[derive(Args, Debug)]
pub struct QcArgs {
    /// Print a JSON summary to stdout.
    #[arg(long = "print")]
    pub print: bool,

    /// Stop at the first example with any error.
    #[arg(long)]
    pub fail_fast: bool,

    /// Only check example files whose name starts with this prefix.
    #[arg(long, value_name = "PREFIX")]
    pub prefix: Option<String>,
}

/// Execute the qc subcommand.
///
/// Returns exit code: 0 when clean, 2 when failures are present.
pub fn run_qc_command(args: &QcArgs, repo_root: &Path) -> Result<u8> {
    let config = crate::load_config(repo_root)?;
    let options = QcOptions {
        fail_fast: args.fail_fast,
        prefix: args.prefix.clone(),
    };
    let outcome = run_qc(&config, options).context("examples QC could not run")?;

    if args.print {
        let report_path = relative_display(&config.layout.report_json(), &config.layout.root);
        let summary = serde_json::to_value(outcome.report.summary(report_path))
            .context("failed to serialize summary")?;
        print!("{}", to_canonical_string(&summary)?);
    }

    Ok(outcome.status.exit_code())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_and_failing_runs() {
        let dir = tempfile::tempdir().unwrap();
        let examples = dir.path().join("examples");
        std::fs::create_dir(&examples).unwrap();
        std::fs::write(examples.join("a.json"), r#"{"name":"A"}"#).unwrap();

        let args = QcArgs {
            print: true,
            fail_fast: false,
            prefix: None,
        };
        assert_eq!(run_qc_command(&args, dir.path()).unwrap(), 0);
        assert!(dir.path().join("meta/output/SCHEMAS_EXAMPLES_QA.md").is_file());

        std::fs::write(examples.join("b.json"), r#"{"name":"A"}"#).unwrap();
        assert_eq!(run_qc_command(&args, dir.path()).unwrap(), 2);
    }

    #[test]
    fn missing_examples_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = QcArgs {
            print: false,
            fail_fast: false,
            prefix: None,
        };
        assert!(run_qc_command(&args, dir.path()).is_err());
    }
}
