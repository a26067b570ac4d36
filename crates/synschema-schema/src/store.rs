//! # Schema Store
//!
//! In-memory map from schema filename to parsed document, built once per
//! run and read-only afterwards.
//!
//! ## Reference forms
//!
//! | Form | Example | Resolution |
//! |------|---------|------------|
//! | Same-document pointer | `#/$defs/Mode` | Walk the referring document |
//! | Canonical absolute URL | `https://schemas.synesthetic.dev/0.7.3/tone.schema.json` | Basename lookup |
//! | Bare/relative filename | `./control.schema.json` | Basename lookup |
//!
//! Cross-document references may carry a `#/…` fragment, which is then
//! resolved inside the target. Anything else is a resolution failure.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use jsonschema::{Retrieve, Uri};
use serde_json::Value;
use thiserror::Error;

use synschema_core::files::read_json;
use synschema_core::{resolve_local_ref, GovernanceError};

/// Filename suffix of every schema document.
pub const SCHEMA_SUFFIX: &str = ".schema.json";

/// Errors while loading the store.
#[derive(Error, Debug)]
pub enum SchemaStoreError {
    /// The schema directory does not exist.
    #[error("schema directory not found: {0}")]
    MissingDirectory(String),

    /// A schema file could not be read or parsed.
    #[error(transparent)]
    File(#[from] GovernanceError),
}

/// A `$ref` that could not be resolved.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    /// A same-document pointer names nothing.
    #[error("unresolved internal $ref in {file}: {reference}")]
    UnresolvedInternal {
        /// Referring document.
        file: String,
        /// The `$ref` value.
        reference: String,
    },

    /// An absolute URL whose basename is not in the store.
    #[error("missing absolute $ref target in store for {file}: {reference}")]
    MissingAbsolute {
        /// Referring document.
        file: String,
        /// The `$ref` value.
        reference: String,
    },

    /// A relative filename not present in the schema directory.
    #[error("missing local $ref file for {file}: {reference}")]
    MissingRelative {
        /// Referring document.
        file: String,
        /// The `$ref` value.
        reference: String,
    },

    /// The reference matches none of the supported forms.
    #[error("unsupported $ref form in {file}: {reference}")]
    Unsupported {
        /// Referring document.
        file: String,
        /// The `$ref` value.
        reference: String,
    },

    /// The referring document is not in the store.
    #[error("unknown schema document: {0}")]
    UnknownDocument(String),
}

/// Sorted `*.schema.json` files directly inside `dir`.
pub fn schema_files(dir: &Path) -> Result<Vec<PathBuf>, GovernanceError> {
    let entries = std::fs::read_dir(dir).map_err(|source| GovernanceError::Io {
        path: dir.display().to_string(),
        source,
    })?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| GovernanceError::Io {
            path: dir.display().to_string(),
            source,
        })?;
        let path = entry.path();
        let is_schema = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(SCHEMA_SUFFIX));
        if is_schema && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Loaded schema documents keyed by filename.
#[derive(Debug, Clone)]
pub struct SchemaStore {
    base_url: String,
    /// Filename -> document.
    documents: BTreeMap<String, Value>,
    /// `$id` -> filename; the first file claiming an id wins.
    ids: BTreeMap<String, String>,
}

impl SchemaStore {
    /// Load every schema in `schema_dir`.
    ///
    /// # Errors
    ///
    /// Fails on a missing directory or on the first unreadable or
    /// malformed document.
    pub fn load(schema_dir: &Path, base_url: &str) -> Result<Self, SchemaStoreError> {
        if !schema_dir.is_dir() {
            return Err(SchemaStoreError::MissingDirectory(
                schema_dir.display().to_string(),
            ));
        }
        let mut documents = Vec::new();
        for path in schema_files(schema_dir)? {
            let value = read_json(&path)?;
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                documents.push((name.to_string(), value));
            }
        }
        let store = Self::from_documents(base_url, documents);
        tracing::debug!(
            dir = %schema_dir.display(),
            schemas = store.len(),
            "loaded schema store"
        );
        Ok(store)
    }

    /// Build a store from already-parsed documents.
    pub fn from_documents<I>(base_url: &str, documents: I) -> Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let documents: BTreeMap<String, Value> = documents.into_iter().collect();
        let mut ids = BTreeMap::new();
        for (name, doc) in &documents {
            if let Some(id) = doc.get("$id").and_then(Value::as_str) {
                ids.entry(id.to_string()).or_insert_with(|| name.clone());
            }
        }
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            documents,
            ids,
        }
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// True when no documents were loaded.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Documents in filename order.
    pub fn documents(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.documents.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Look up a document by filename.
    pub fn get(&self, file_name: &str) -> Option<&Value> {
        self.documents.get(file_name)
    }

    /// Look up a document by `$id`.
    pub fn get_by_id(&self, id: &str) -> Option<&Value> {
        self.ids.get(id).and_then(|name| self.documents.get(name))
    }

    /// True when `file_name` is a member of the store.
    pub fn contains(&self, file_name: &str) -> bool {
        self.documents.contains_key(file_name)
    }

    /// Resolve `reference` as written inside `from_file`.
    pub fn resolve(&self, from_file: &str, reference: &str) -> Result<&Value, ReferenceError> {
        let origin = self
            .documents
            .get(from_file)
            .ok_or_else(|| ReferenceError::UnknownDocument(from_file.to_string()))?;
        self.resolve_in(origin, from_file, reference)
    }

    /// Resolve `reference` relative to an arbitrary document `origin`.
    ///
    /// `label` names `origin` in error messages.
    pub fn resolve_in<'a>(
        &'a self,
        origin: &'a Value,
        label: &str,
        reference: &str,
    ) -> Result<&'a Value, ReferenceError> {
        let err_fields = || (label.to_string(), reference.to_string());

        if reference.starts_with('#') {
            return resolve_local_ref(origin, reference).ok_or_else(|| {
                let (file, reference) = err_fields();
                ReferenceError::UnresolvedInternal { file, reference }
            });
        }

        let (document_part, fragment) = match reference.split_once('#') {
            Some((doc, frag)) => (doc, Some(frag)),
            None => (reference, None),
        };
        if !document_part.ends_with(SCHEMA_SUFFIX) {
            let (file, reference) = err_fields();
            return Err(ReferenceError::Unsupported { file, reference });
        }

        let is_url = document_part.contains("://");
        if is_url && !document_part.starts_with(&format!("{}/", self.base_url)) {
            let (file, reference) = err_fields();
            return Err(ReferenceError::Unsupported { file, reference });
        }

        let name = basename(document_part);
        let target = self.documents.get(name).ok_or_else(|| {
            let (file, reference) = err_fields();
            if is_url {
                ReferenceError::MissingAbsolute { file, reference }
            } else {
                ReferenceError::MissingRelative { file, reference }
            }
        })?;

        match fragment {
            None | Some("") => Ok(target),
            Some(frag) => resolve_local_ref(target, &format!("#{frag}")).ok_or_else(|| {
                let (file, reference) = err_fields();
                ReferenceError::UnresolvedInternal { file, reference }
            }),
        }
    }

    /// A `jsonschema` retriever over the store's documents.
    pub fn retriever(&self) -> StoreRetriever {
        let mut by_uri = HashMap::new();
        for (id, name) in &self.ids {
            if let Some(doc) = self.documents.get(name) {
                by_uri.insert(id.clone(), doc.clone());
            }
        }
        StoreRetriever {
            by_uri,
            by_name: self
                .documents
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

fn basename(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}

/// Resolves cross-document `$ref`s for the validator from the local store.
///
/// Lookup is by exact `$id` first, then by the URI's final path segment.
/// Unknown URIs are errors; nothing is fetched over the network.
#[derive(Debug, Clone)]
pub struct StoreRetriever {
    by_uri: HashMap<String, Value>,
    by_name: HashMap<String, Value>,
}

impl Retrieve for StoreRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();
        if let Some(value) = self.by_uri.get(uri_str) {
            return Ok(value.clone());
        }
        let name = basename(uri_str);
        if name.ends_with(SCHEMA_SUFFIX) {
            if let Some(value) = self.by_name.get(name) {
                return Ok(value.clone());
            }
        }
        Err(format!("schema not found in local store for URI: {uri_str}").into())
    }
}
