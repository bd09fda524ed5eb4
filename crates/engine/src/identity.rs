//! Identifier-based entry tracking across snapshots.
//!
//! Entries carry a stable identifier that survives renames. Indexing both
//! snapshots by identifier lets an add/delete pair sharing an identifier be
//! reported as a single rename. Only top-level entries are indexed.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::dictionary::Dictionary;

/// Two entries in one snapshot claiming the same identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateIdentifier {
    pub identifier: String,
    /// The entry the index resolves the identifier to.
    pub kept: String,
    /// The earlier entry that lost the slot.
    pub shadowed: String,
}

/// Identifier -> entry name for one snapshot.
#[derive(Debug, Clone, Default)]
pub struct IdentityIndex<'a> {
    by_identifier: HashMap<&'a str, &'a str>,
    by_name: HashMap<&'a str, &'a str>,
    duplicates: Vec<DuplicateIdentifier>,
}

impl<'a> IdentityIndex<'a> {
    /// Index every entry that carries an identifier.
    ///
    /// Entries without one are left out and can only be matched by name.
    /// When two entries share an identifier the later one in name order
    /// wins and the clash is kept in [`duplicates`](Self::duplicates).
    pub fn build(dictionary: &'a Dictionary) -> Self {
        let mut index = IdentityIndex::default();
        for entry in dictionary.entries() {
            let Some(identifier) = entry.identifier() else {
                continue;
            };
            index.by_name.insert(entry.name(), identifier);
            if let Some(previous) = index.by_identifier.insert(identifier, entry.name()) {
                index.duplicates.push(DuplicateIdentifier {
                    identifier: identifier.to_string(),
                    kept: entry.name().to_string(),
                    shadowed: previous.to_string(),
                });
            }
        }
        index
    }

    /// The entry name an identifier resolves to.
    pub fn name_of(&self, identifier: &str) -> Option<&'a str> {
        self.by_identifier.get(identifier).copied()
    }

    /// The identifier carried by the entry called `name`.
    pub fn identifier_of(&self, name: &str) -> Option<&'a str> {
        self.by_name.get(name).copied()
    }

    pub fn duplicates(&self) -> &[DuplicateIdentifier] {
        &self.duplicates
    }

    /// Number of distinct identifiers.
    pub fn len(&self) -> usize {
        self.by_identifier.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_identifier.is_empty()
    }
}

/// Pull renames out of the name-keyed `added`/`deleted` sets.
///
/// A name in `added` is a rename when its identifier resolves to a
/// different name in the original snapshot. The new name leaves `added`,
/// the old name leaves `deleted` (it may not be there if the old name was
/// reused by another entry), and the pair is returned as new -> old.
pub fn detect_renames<'a>(
    original: &IdentityIndex<'a>,
    updated: &IdentityIndex<'a>,
    added: &mut BTreeSet<&'a str>,
    deleted: &mut BTreeSet<&'a str>,
) -> BTreeMap<&'a str, &'a str> {
    let mut renames = BTreeMap::new();

    let candidates: Vec<&'a str> = added.iter().copied().collect();
    for new_name in candidates {
        let Some(identifier) = updated.identifier_of(new_name) else {
            continue;
        };
        // A shadowed duplicate does not own its identifier.
        if updated.name_of(identifier) != Some(new_name) {
            continue;
        }
        let Some(old_name) = original.name_of(identifier) else {
            continue;
        };
        if old_name == new_name {
            continue;
        }
        added.remove(new_name);
        deleted.remove(old_name);
        renames.insert(new_name, old_name);
    }

    renames
}
