//! # QC Reports
//!
//! Serializable report types and the Markdown rendering. All maps are
//! `BTreeMap` so serialized output is ordered without extra sorting.

use std::collections::BTreeMap;

use serde::Serialize;

use synschema_schema::ValidationIssue;

/// Whether a canonical spec was found or a draft was synthesized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SpecStatus {
    /// A canonical schema exists.
    Present,
    /// A draft was synthesized from the examples.
    Draft,
}

impl SpecStatus {
    /// Uppercase label as written in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Present => "PRESENT",
            Self::Draft => "DRAFT",
        }
    }
}

/// Aggregate counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    /// Example files discovered.
    pub files_total: usize,
    /// Files that passed every check.
    pub valid: usize,
    /// Files with at least one error.
    pub invalid: usize,
    /// Names claimed by more than one blessed file.
    pub duplicates: usize,
}

/// One row of the blessed index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlessedEntry {
    /// Repository-relative path.
    pub file: String,
    /// The example's `name`.
    pub name: String,
}

/// The machine-readable QA report.
#[derive(Debug, Clone, Serialize)]
pub struct QcReport {
    /// Spec status.
    pub spec_status: SpecStatus,
    /// Repository-relative path of the schema validated against.
    pub schema_path: String,
    /// True when a draft schema was written this run.
    pub draft_emitted: bool,
    /// Aggregate counts.
    pub totals: Totals,
    /// Repository-relative path of the blessed index.
    pub blessed_index_path: String,
    /// Duplicated name -> files claiming it.
    pub duplicates: BTreeMap<String, Vec<String>>,
    /// File -> sorted errors, for files with at least one error.
    pub files: BTreeMap<String, Vec<ValidationIssue>>,
}

/// The compact summary printed on request.
#[derive(Debug, Clone, Serialize)]
pub struct QcSummary {
    /// Spec status.
    pub spec: SpecStatus,
    /// Valid files.
    pub valid: usize,
    /// Invalid files.
    pub invalid: usize,
    /// Duplicated names.
    pub duplicates: usize,
    /// Repository-relative path of the JSON report.
    pub report: String,
}

impl QcReport {
    /// Summary view of this report.
    pub fn summary(&self, report_path: impl Into<String>) -> QcSummary {
        QcSummary {
            spec: self.spec_status,
            valid: self.totals.valid,
            invalid: self.totals.invalid,
            duplicates: self.totals.duplicates,
            report: report_path.into(),
        }
    }

    /// True when any file failed or any name is duplicated.
    pub fn has_failures(&self) -> bool {
        !self.files.is_empty() || !self.duplicates.is_empty()
    }
}

/// Render the human-readable report.
pub fn render_markdown(report: &QcReport, blessed: &[BlessedEntry]) -> String {
    let mut lines: Vec<String> = vec![
        "# Schemas & Examples QA".into(),
        String::new(),
        "## Overview".into(),
        "Deterministic QA for Synesthetic examples.".into(),
        String::new(),
        "## Spec Status".into(),
        report.spec_status.as_str().into(),
        String::new(),
        "## Totals".into(),
        format!("- Files: {}", report.totals.files_total),
        format!("- Valid: {}", report.totals.valid),
        format!("- Invalid: {}", report.totals.invalid),
        format!("- Duplicate names: {}", report.totals.duplicates),
        String::new(),
        "## Blessed".into(),
    ];

    if blessed.is_empty() {
        lines.push("- (none)".into());
    }
    for entry in blessed {
        lines.push(format!("- {} :: {}", entry.name, entry.file));
    }
    lines.push(String::new());

    lines.push("## Duplicates".into());
    if report.duplicates.is_empty() {
        lines.push("- (none)".into());
    }
    for (name, files) in &report.duplicates {
        lines.push(format!("- {name}: {}", files.join(", ")));
    }
    lines.push(String::new());

    lines.push("## Failures".into());
    if report.files.is_empty() {
        lines.push("- (none)".into());
    }
    for (file, issues) in &report.files {
        lines.push(format!("- {file}"));
        for issue in issues {
            lines.push(format!("  - {issue}"));
        }
    }
    lines.push(String::new());

    lines.push("## Next Actions".into());
    lines.push(if report.draft_emitted {
        "- Harden draft schema and promote to canonical.".into()
    } else {
        "- Fix examples to conform; remove duplicates.".into()
    });

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
