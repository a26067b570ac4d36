//! # synschema-schema — Schema Store, Normalizer & Validation
//!
//! Everything that reads or rewrites the `jsonschema/` directory, plus the
//! adapter that validates example payloads against it.
//!
//! ## Store (`store`)
//!
//! [`SchemaStore`] loads every `*.schema.json` once per run and resolves the
//! three supported `$ref` forms: same-document pointers, absolute URLs under
//! the canonical base, and bare filenames. It also supplies the
//! `jsonschema` retriever so validation never touches the network.
//!
//! ## Normalizer (`normalize`)
//!
//! [`normalize()`] stamps identity metadata, locks the root
//! `additionalProperties`, strips enum defaults from optional properties
//! (copy-on-strip through `$ref`), and pins absolute references to the
//! current version. It is idempotent; [`normalize_store`] runs it across the
//! directory in write or check mode.
//!
//! ## Lint (`lint`)
//!
//! [`lint()`] checks `$id` uniqueness and that every `$ref` resolves.
//!
//! ## Validator adapter (`validate`)
//!
//! [`ExampleValidator`] wraps a compiled Draft 2020-12 validator. Only the
//! top-level `$schemaRef` key is stripped before validation; the envelope
//! check flags persistence keys and unknown `$` metadata separately.

pub mod lint;
pub mod normalize;
pub mod store;
pub mod validate;

pub use lint::{lint, LintIssue};
pub use normalize::{
    normalize, normalize_store, FileStatus, NormalizeError, NormalizeMode, NormalizeOptions,
    NormalizeReport, Normalized, Offense, OffenseKind,
};
pub use store::{ReferenceError, SchemaStore, SchemaStoreError, StoreRetriever, SCHEMA_SUFFIX};
pub use validate::{
    check_envelope, strip_schema_ref, ExampleValidator, ValidationIssue, ValidatorBuildError,
    FORBIDDEN_ENVELOPE_KEYS, SCHEMA_REF_KEY,
};
