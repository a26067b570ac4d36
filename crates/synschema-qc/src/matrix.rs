//! # Field Presence Matrix
//!
//! For every pointer observed across a set of instances: how many instances
//! reach it, what share of the set that is, and which value kinds appear
//! there. The root pointer `""` is always present in every instance.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::Value;

use synschema_core::{json_pointer, ValueKind, Walker};

/// Aggregate for one pointer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldPresence {
    /// Instances in which the pointer occurs.
    pub occurrences: usize,
    /// `occurrences / total * 100`, rounded to two decimals.
    pub presence_pct: f64,
    /// Observed value kinds, sorted.
    pub types: BTreeSet<ValueKind>,
}

/// Pointer -> presence record, ordered by pointer.
pub type FieldMatrix = BTreeMap<String, FieldPresence>;

/// Build the matrix over `instances`.
pub fn field_matrix<'a, I>(instances: I) -> FieldMatrix
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut counts: BTreeMap<String, (usize, BTreeSet<ValueKind>)> = BTreeMap::new();
    let mut total = 0usize;

    for instance in instances {
        total += 1;
        Walker::new(instance).visit(|path, node| {
            let entry = counts.entry(json_pointer(path.iter())).or_default();
            entry.0 += 1;
            entry.1.insert(ValueKind::of(node));
        });
    }

    counts
        .into_iter()
        .map(|(pointer, (occurrences, types))| {
            let presence = FieldPresence {
                occurrences,
                presence_pct: percent(occurrences, total),
                types,
            };
            (pointer, presence)
        })
        .collect()
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let pct = count as f64 / total as f64 * 100.0;
    (pct * 100.0).round() / 100.0
}
