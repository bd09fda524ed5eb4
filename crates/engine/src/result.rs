//! The classified diff between two dictionaries.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Which side of a leaf difference carries a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// The path exists only in the updated entry.
    Added,
    /// The path exists only in the original entry.
    Deleted,
    /// The path exists on both sides with different values.
    Updated,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Added => write!(f, "added"),
            ChangeKind::Deleted => write!(f, "deleted"),
            ChangeKind::Updated => write!(f, "updated"),
        }
    }
}

/// A single leaf-level difference inside an entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    /// Dotted path with bracketed array indices, e.g. `sets.light.value`
    /// or `value[2]`.
    pub path: String,
    pub kind: ChangeKind,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub original_value: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub new_value: Option<Value>,
}

/// A key that is present is `Some`, even when it holds `null`; only a
/// missing key reads as `None`.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl Change {
    pub fn updated(path: impl Into<String>, original: Value, new: Value) -> Self {
        Change {
            path: path.into(),
            kind: ChangeKind::Updated,
            original_value: Some(original),
            new_value: Some(new),
        }
    }

    pub fn added(path: impl Into<String>, new: Value) -> Self {
        Change {
            path: path.into(),
            kind: ChangeKind::Added,
            original_value: None,
            new_value: Some(new),
        }
    }

    pub fn deleted(path: impl Into<String>, original: Value) -> Self {
        Change {
            path: path.into(),
            kind: ChangeKind::Deleted,
            original_value: Some(original),
            new_value: None,
        }
    }
}

/// Rename record keyed by the new name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rename {
    #[serde(rename = "old-name")]
    pub old_name: String,
}

/// The six mutually exclusive classifications an entry can receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Renamed,
    Deprecated,
    Reverted,
    Added,
    Deleted,
    Updated,
}

impl Bucket {
    /// Every bucket, in report order.
    pub const ALL: [Bucket; 6] = [
        Bucket::Renamed,
        Bucket::Deprecated,
        Bucket::Reverted,
        Bucket::Added,
        Bucket::Deleted,
        Bucket::Updated,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Bucket::Renamed => "renamed",
            Bucket::Deprecated => "deprecated",
            Bucket::Reverted => "reverted",
            Bucket::Added => "added",
            Bucket::Deleted => "deleted",
            Bucket::Updated => "updated",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The classified differences between an original and an updated dictionary.
///
/// Each bucket is keyed by entry name, and a name appears in at most one
/// bucket. Renames are keyed by the new name; deletions by the old one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiffResult {
    /// New name -> old name, for entries whose identifier moved.
    pub renamed: BTreeMap<String, Rename>,
    /// Entries that became deprecated, as they appear in the updated snapshot.
    pub deprecated: BTreeMap<String, Value>,
    /// Entries whose deprecation was lifted, as they appear in the updated snapshot.
    pub reverted: BTreeMap<String, Value>,
    /// Entries new in the updated snapshot.
    pub added: BTreeMap<String, Value>,
    /// Entries missing from the updated snapshot, as they were in the original.
    pub deleted: BTreeMap<String, Value>,
    /// Same-name entries whose content changed.
    pub updated: BTreeMap<String, Vec<Change>>,
}

impl DiffResult {
    /// Returns true if there are no differences.
    pub fn is_empty(&self) -> bool {
        self.renamed.is_empty()
            && self.deprecated.is_empty()
            && self.reverted.is_empty()
            && self.added.is_empty()
            && self.deleted.is_empty()
            && self.updated.is_empty()
    }

    /// The bucket `name` was classified into, if any.
    pub fn bucket_of(&self, name: &str) -> Option<Bucket> {
        Bucket::ALL
            .into_iter()
            .find(|bucket| self.bucket_contains(*bucket, name))
    }

    /// Every bucket holding `name`. A well-formed result has at most one.
    pub fn buckets_of(&self, name: &str) -> Vec<Bucket> {
        Bucket::ALL
            .into_iter()
            .filter(|bucket| self.bucket_contains(*bucket, name))
            .collect()
    }

    fn bucket_contains(&self, bucket: Bucket, name: &str) -> bool {
        match bucket {
            Bucket::Renamed => self.renamed.contains_key(name),
            Bucket::Deprecated => self.deprecated.contains_key(name),
            Bucket::Reverted => self.reverted.contains_key(name),
            Bucket::Added => self.added.contains_key(name),
            Bucket::Deleted => self.deleted.contains_key(name),
            Bucket::Updated => self.updated.contains_key(name),
        }
    }

    pub fn count(&self, bucket: Bucket) -> usize {
        match bucket {
            Bucket::Renamed => self.renamed.len(),
            Bucket::Deprecated => self.deprecated.len(),
            Bucket::Reverted => self.reverted.len(),
            Bucket::Added => self.added.len(),
            Bucket::Deleted => self.deleted.len(),
            Bucket::Updated => self.updated.len(),
        }
    }

    pub fn summary(&self) -> DiffSummary {
        DiffSummary {
            renamed: self.renamed.len(),
            deprecated: self.deprecated.len(),
            reverted: self.reverted.len(),
            added: self.added.len(),
            deleted: self.deleted.len(),
            updated: self.updated.len(),
            total: Bucket::ALL.into_iter().map(|b| self.count(b)).sum(),
        }
    }
}

/// Per-bucket entry counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub renamed: usize,
    pub deprecated: usize,
    pub reverted: usize,
    pub added: usize,
    pub deleted: usize,
    pub updated: usize,
    pub total: usize,
}
