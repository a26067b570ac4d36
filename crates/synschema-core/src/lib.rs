#![deny(missing_docs)]

//! # synschema-core — Foundational Types for Schema Governance
//!
//! This crate holds the pieces every other crate in the workspace leans on.
//! It has no internal crate dependencies, only `serde`, `serde_json` and
//! `thiserror` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **JSON is a closed tagged tree.** Documents are `serde_json::Value`
//!    and every traversal is recursive pattern matching over it. The
//!    [`walk`] module is the one place that decides visiting order
//!    (object keys sorted, array items in order).
//!
//! 2. **Shared definitions are read-only.** [`pointer::resolve_local_ref`]
//!    hands out borrows; callers that need to specialise a definition take
//!    an owned copy via [`pointer::resolve_local_ref_owned`] and attach it
//!    at their own call site.
//!
//! 3. **One context object per run.** [`GovernanceConfig`] carries the
//!    schema version, base URL and repository layout. Nothing is stored in
//!    process-wide statics.
//!
//! 4. **One writer for JSON artifacts.** [`files::write_json`] sorts keys
//!    recursively so every emitted file is byte-stable across runs.

pub mod canonical;
pub mod config;
pub mod error;
pub mod files;
pub mod pointer;
pub mod walk;

pub use canonical::{sorted_value, to_canonical_string};
pub use config::{GovernanceConfig, RepoLayout, SchemaVersion};
pub use error::{ConfigError, GovernanceError};
pub use pointer::{json_pointer, resolve_local_ref, resolve_local_ref_owned, PathSegment};
pub use walk::{ValueKind, Walker};
