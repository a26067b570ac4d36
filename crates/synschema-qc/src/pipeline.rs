//! # Certification Pipeline
//!
//! Runs the example QA gate as explicit phases over one [`GovernanceConfig`]:
//!
//! | Phase | Step |
//! |-------|------|
//! | S1 | Discover the canonical asset schema |
//! | S2 | Synthesize and write a draft schema if none exists |
//! | S3 | Validate every example: parse, envelope, schema |
//! | S4 | Bless clean examples and detect duplicate names |
//! | S5 | Write the JSON report, Markdown report, blessed index and field matrix |
//! | S6 | Map the outcome to a [`GateStatus`] |
//!
//! Per-file problems never abort the run; they are collected into the
//! report. Only setup problems (missing example tree, unreadable spec,
//! unwritable output) surface as [`QcError`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use synschema_core::files::{read_json, relative_display, write_json, write_text};
use synschema_core::{GovernanceConfig, GovernanceError};
use synschema_schema::{
    check_envelope, ExampleValidator, SchemaStore, SchemaStoreError, ValidationIssue,
};

use crate::discover::{discover_spec, list_examples};
use crate::draft::{draft_note, has_name, synthesize_draft};
use crate::matrix::{field_matrix, FieldMatrix};
use crate::report::{render_markdown, BlessedEntry, QcReport, SpecStatus, Totals};

/// Setup failures that stop the run.
#[derive(Error, Debug)]
pub enum QcError {
    /// The examples directory does not exist.
    #[error("examples directory not found: {0}")]
    MissingExamples(String),

    /// The examples directory holds no matching files.
    #[error("no example files found under {0}")]
    NoExamples(String),

    /// The schema store could not be loaded.
    #[error(transparent)]
    Store(#[from] SchemaStoreError),

    /// Reading the spec or writing an artifact failed.
    #[error(transparent)]
    File(#[from] GovernanceError),
}

/// CI gate result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateStatus {
    /// Every file valid, no duplicate names.
    Clean,
    /// At least one invalid file or duplicated name.
    Failures,
    /// The run could not complete.
    SetupFailure,
}

impl GateStatus {
    /// Process exit code for this status.
    pub fn exit_code(self) -> u8 {
        match self {
            Self::Clean => 0,
            Self::Failures => 2,
            Self::SetupFailure => 3,
        }
    }
}

/// Run options.
#[derive(Debug, Clone, Default)]
pub struct QcOptions {
    /// Stop the sweep at the first file with any error.
    pub fail_fast: bool,
    /// Only consider example files whose name starts with this.
    pub prefix: Option<String>,
}

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct QcOutcome {
    /// The JSON report.
    pub report: QcReport,
    /// Blessed examples carrying a name, in file order.
    pub blessed: Vec<BlessedEntry>,
    /// Field presence over parsed object/array examples.
    pub matrix: FieldMatrix,
    /// Gate result.
    pub status: GateStatus,
}

/// A discovered example and its parse result.
struct Example {
    rel: String,
    parsed: Result<Value, String>,
}

/// Result of the validation sweep.
struct Sweep<'e> {
    /// File -> sorted errors, only for files with errors.
    per_file: BTreeMap<String, Vec<ValidationIssue>>,
    /// `(file, instance)` for clean files, in file order.
    blessed: Vec<(&'e str, &'e Value)>,
}

/// The schema examples are validated against.
struct Spec {
    path: PathBuf,
    schema: Value,
    status: SpecStatus,
    draft_emitted: bool,
}

/// The certification pipeline over one repository.
pub struct Pipeline<'c> {
    config: &'c GovernanceConfig,
    options: QcOptions,
}

impl<'c> Pipeline<'c> {
    /// Pipeline over `config`'s layout.
    pub fn new(config: &'c GovernanceConfig, options: QcOptions) -> Self {
        Self { config, options }
    }

    /// Run every phase and write the artifacts.
    pub fn run(&self) -> Result<QcOutcome, QcError> {
        let layout = &self.config.layout;
        let examples = self.load_examples()?;
        tracing::info!(files = examples.len(), "discovered examples");

        let spec = self.resolve_spec(&examples)?;
        tracing::debug!(
            schema = %spec.path.display(),
            status = spec.status.as_str(),
            "spec resolved"
        );

        let store = if layout.schema_dir.is_dir() {
            SchemaStore::load(&layout.schema_dir, &self.config.base_url)?
        } else {
            SchemaStore::from_documents(&self.config.base_url, Vec::new())
        };
        let label = relative_display(&spec.path, &layout.root);
        let validator = ExampleValidator::new(&spec.schema, &store, &label);
        if let Err(e) = &validator {
            tracing::warn!(error = %e, "spec failed to compile");
        }

        let Sweep { per_file, blessed } =
            self.sweep(&examples, validator.as_ref().map_err(|e| e.to_string()));
        let duplicates = detect_duplicates(&blessed);
        let blessed_index: Vec<BlessedEntry> = blessed
            .iter()
            .filter(|(_, v)| has_name(v))
            .filter_map(|(rel, v)| {
                Some(BlessedEntry {
                    file: rel.to_string(),
                    name: v.get("name")?.as_str()?.to_string(),
                })
            })
            .collect();

        let matrix = field_matrix(
            examples
                .iter()
                .filter_map(|ex| ex.parsed.as_ref().ok())
                .filter(|v| v.is_object() || v.is_array()),
        );

        let report = QcReport {
            spec_status: spec.status,
            schema_path: label,
            draft_emitted: spec.draft_emitted,
            totals: Totals {
                files_total: examples.len(),
                valid: blessed.len(),
                invalid: per_file.len(),
                duplicates: duplicates.len(),
            },
            blessed_index_path: relative_display(&layout.blessed_index(), &layout.root),
            duplicates,
            files: per_file,
        };

        self.write_reports(&report, &blessed_index, &matrix)?;

        let status = if report.has_failures() {
            GateStatus::Failures
        } else {
            GateStatus::Clean
        };
        tracing::info!(
            valid = report.totals.valid,
            invalid = report.totals.invalid,
            duplicates = report.totals.duplicates,
            "qc finished"
        );

        Ok(QcOutcome {
            report,
            blessed: blessed_index,
            matrix,
            status,
        })
    }

    fn load_examples(&self) -> Result<Vec<Example>, QcError> {
        let layout = &self.config.layout;
        if !layout.examples_dir.is_dir() {
            return Err(QcError::MissingExamples(
                layout.examples_dir.display().to_string(),
            ));
        }
        let paths = list_examples(&layout.examples_dir, self.options.prefix.as_deref())?;
        if paths.is_empty() {
            return Err(QcError::NoExamples(layout.examples_dir.display().to_string()));
        }
        Ok(paths
            .iter()
            .map(|path| Example {
                rel: relative_display(path, &layout.root),
                parsed: parse_example(path),
            })
            .collect())
    }

    /// S1 + S2.
    fn resolve_spec(&self, examples: &[Example]) -> Result<Spec, QcError> {
        let layout = &self.config.layout;
        if let Some(path) = discover_spec(&layout.root) {
            let schema = read_json(&path)?;
            return Ok(Spec {
                path,
                schema,
                status: SpecStatus::Present,
                draft_emitted: false,
            });
        }

        let parsed: Vec<&Value> = examples.iter().filter_map(|ex| ex.parsed.as_ref().ok()).collect();
        let schema = synthesize_draft(parsed.iter().copied());
        write_json(&layout.draft_schema_path, &schema)?;
        write_text(&layout.draft_spec_path, &draft_note(&field_matrix(parsed)))?;
        tracing::warn!(
            path = %layout.draft_schema_path.display(),
            "no canonical schema found, emitted draft"
        );

        Ok(Spec {
            path: layout.draft_schema_path.clone(),
            schema,
            status: SpecStatus::Draft,
            draft_emitted: true,
        })
    }

    /// S3 + S4 blessing. Stops after the first failing file in fail-fast mode;
    /// files after that point are neither failed nor blessed.
    fn sweep<'e>(
        &self,
        examples: &'e [Example],
        validator: Result<&ExampleValidator, String>,
    ) -> Sweep<'e> {
        let mut sweep = Sweep {
            per_file: BTreeMap::new(),
            blessed: Vec::new(),
        };
        for example in examples {
            let mut issues = match &example.parsed {
                Err(e) => vec![ValidationIssue::file_level(format!("Invalid JSON: {e}"))],
                Ok(instance) => {
                    let mut issues = check_envelope(instance);
                    match &validator {
                        Ok(v) => issues.extend(v.validate(instance)),
                        Err(reason) => issues.push(ValidationIssue::file_level(format!(
                            "Validation error: {reason}"
                        ))),
                    }
                    if issues.is_empty() {
                        sweep.blessed.push((example.rel.as_str(), instance));
                        continue;
                    }
                    issues
                }
            };
            issues.sort();
            tracing::debug!(file = %example.rel, errors = issues.len(), "example rejected");
            sweep.per_file.insert(example.rel.clone(), issues);
            if self.options.fail_fast {
                tracing::info!(file = %example.rel, "fail-fast: stopping sweep");
                break;
            }
        }
        sweep
    }

    /// S5.
    fn write_reports(
        &self,
        report: &QcReport,
        blessed: &[BlessedEntry],
        matrix: &FieldMatrix,
    ) -> Result<(), QcError> {
        let layout = &self.config.layout;
        write_json(&layout.report_json(), &to_value(report)?)?;
        write_text(&layout.report_markdown(), &render_markdown(report, blessed))?;
        write_json(&layout.blessed_index(), &to_value(blessed)?)?;
        write_json(&layout.field_matrix(), &to_value(matrix)?)?;
        Ok(())
    }
}

/// Run the pipeline with `options`.
pub fn run_qc(config: &GovernanceConfig, options: QcOptions) -> Result<QcOutcome, QcError> {
    Pipeline::new(config, options).run()
}

fn parse_example(path: &Path) -> Result<Value, String> {
    let text = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    serde_json::from_str(&text).map_err(|e| e.to_string())
}

fn to_value<T: serde::Serialize + ?Sized>(value: &T) -> Result<Value, GovernanceError> {
    serde_json::to_value(value).map_err(GovernanceError::Serialize)
}

/// Names (non-blank) claimed by two or more blessed files.
fn detect_duplicates(blessed: &[(&str, &Value)]) -> BTreeMap<String, Vec<String>> {
    let mut by_name: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (rel, instance) in blessed {
        if !has_name(instance) {
            continue;
        }
        if let Some(name) = instance.get("name").and_then(Value::as_str) {
            by_name.entry(name.to_string()).or_default().push(rel.to_string());
        }
    }
    by_name.retain(|_, files| files.len() > 1);
    for files in by_name.values_mut() {
        files.sort();
    }
    by_name
}
