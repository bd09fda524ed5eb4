//! Top-level classification of two dictionary snapshots.

use serde_json::Value;
use std::collections::BTreeSet;
use tracing::{debug, warn};

use crate::deprecation::{lifecycle, Lifecycle};
use crate::dictionary::{Dictionary, Entry};
use crate::error::DictionaryError;
use crate::flatten::flatten_diff;
use crate::identity::{detect_renames, IdentityIndex};
use crate::result::{Change, DiffResult, Rename};
use crate::tree::{diff_value, SlotDiff};

/// Diff two dictionaries and classify every differing entry.
///
/// Entries are first split by name into added, deleted and common. Add and
/// delete pairs sharing an identifier become renames. Common entries whose
/// `deprecated` flag moved are reported as deprecated or reverted,
/// regardless of what else changed. Everything else that differs is
/// flattened into per-path changes under `updated`.
pub fn diff_dictionaries(original: &Dictionary, updated: &Dictionary) -> DiffResult {
    let mut added: BTreeSet<&str> = updated.names().filter(|n| !original.contains(n)).collect();
    let mut deleted: BTreeSet<&str> = original.names().filter(|n| !updated.contains(n)).collect();

    let original_index = IdentityIndex::build(original);
    let updated_index = IdentityIndex::build(updated);
    for duplicate in original_index
        .duplicates()
        .iter()
        .chain(updated_index.duplicates())
    {
        warn!(
            identifier = %duplicate.identifier,
            kept = %duplicate.kept,
            shadowed = %duplicate.shadowed,
            "duplicate identifier; rename matching uses the kept entry"
        );
    }

    let renames = detect_renames(&original_index, &updated_index, &mut added, &mut deleted);

    let mut result = DiffResult::default();

    for (new_name, old_name) in renames {
        result.renamed.insert(
            new_name.to_string(),
            Rename {
                old_name: old_name.to_string(),
            },
        );
    }
    for name in added {
        if let Some(entry) = updated.get(name) {
            result.added.insert(name.to_string(), entry.value().clone());
        }
    }
    for name in deleted {
        if let Some(entry) = original.get(name) {
            result.deleted.insert(name.to_string(), entry.value().clone());
        }
    }

    for before in original.entries() {
        let Some(after) = updated.get(before.name()) else {
            continue;
        };
        if before.value() == after.value() {
            continue;
        }
        let name = before.name().to_string();
        match lifecycle(&before, &after) {
            Lifecycle::Deprecated => {
                result.deprecated.insert(name, after.value().clone());
            }
            Lifecycle::Reverted => {
                result.reverted.insert(name, after.value().clone());
            }
            Lifecycle::Steady => {
                let changes = entry_changes(&before, &after);
                if !changes.is_empty() {
                    result.updated.insert(name, changes);
                }
            }
        }
    }

    let summary = result.summary();
    debug!(
        original = original.len(),
        updated = updated.len(),
        renamed = summary.renamed,
        deprecated = summary.deprecated,
        reverted = summary.reverted,
        added = summary.added,
        deleted = summary.deleted,
        changed = summary.updated,
        "classified dictionary diff"
    );

    result
}

/// Leaf-level changes between two versions of one entry.
fn entry_changes(before: &Entry<'_>, after: &Entry<'_>) -> Vec<Change> {
    match diff_value(before.value(), after.value()) {
        SlotDiff::Unchanged => Vec::new(),
        SlotDiff::Partial(diff) => flatten_diff(&diff, before.value()),
        // Entries are always objects, so this only fires for hand-built input.
        SlotDiff::Replaced(new) => vec![Change::updated("", before.value().clone(), new.clone())],
    }
}

/// Validate two parsed JSON documents as dictionaries and diff them.
pub fn diff_json(original: Value, updated: Value) -> Result<DiffResult, DictionaryError> {
    let original = Dictionary::try_from(original)?;
    let updated = Dictionary::try_from(updated)?;
    Ok(diff_dictionaries(&original, &updated))
}
