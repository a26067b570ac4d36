//! # synschema-qc — Example Certification Pipeline
//!
//! Certifies that the example corpus validates against the current asset
//! schema and emits the deterministic reports used as a CI gate.
//!
//! ## Phases
//!
//! [`Pipeline::run`] discovers the canonical schema (or synthesizes a draft
//! from the examples), validates every example, blesses the clean ones,
//! detects duplicate names among them, and writes four artifacts under
//! `meta/output/`. The outcome maps to a [`GateStatus`] exit code.
//!
//! ## Building blocks
//!
//! - [`matrix`]: field presence per pointer across the corpus.
//! - [`draft`]: the permissive draft schema and its note.
//! - [`discover`]: canonical schema candidates and example listing.
//! - [`report`]: report types and Markdown rendering.
//! - [`selection`]: per-example schema choice for `synschema validate`.

pub mod discover;
pub mod draft;
pub mod matrix;
pub mod pipeline;
pub mod report;
pub mod selection;

pub use discover::{discover_spec, list_examples};
pub use draft::synthesize_draft;
pub use matrix::{field_matrix, FieldMatrix, FieldPresence};
pub use pipeline::{run_qc, GateStatus, Pipeline, QcError, QcOptions, QcOutcome};
pub use report::{render_markdown, BlessedEntry, QcReport, QcSummary, SpecStatus, Totals};
pub use selection::{select_schema, ExampleChecker, SelectionError, SCHEMA_TOKENS};
