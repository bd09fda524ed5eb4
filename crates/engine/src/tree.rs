//! Generic recursive diff over JSON values.
//!
//! [`diff_value`] compares two values occupying the same logical slot and
//! partitions their differences into three trees:
//!
//! - `added`: keys (or array indices) present only in the updated value,
//! - `deleted`: keys present only in the original value,
//! - `updated`: keys present in both whose values differ.
//!
//! Each tree mirrors the nesting of the inputs, so a change deep inside a
//! map shows up as a chain of [`DiffNode::Nested`] nodes ending in a leaf.
//! The trees borrow from the inputs; nothing is cloned.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// One step of a path into a JSON value.
///
/// Within a single map or array all keys share a variant, so the derived
/// ordering gives sorted map keys and numeric array indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathKey<'a> {
    Field(&'a str),
    Index(usize),
}

impl fmt::Display for PathKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathKey::Field(name) => write!(f, "{}", name),
            PathKey::Index(index) => write!(f, "[{}]", index),
        }
    }
}

/// A node in one of the three diff trees.
#[derive(Debug, Clone, PartialEq)]
pub enum DiffNode<'a> {
    /// The slot now holds this value (used by `added` and `updated`).
    Value(&'a Value),
    /// The slot no longer exists (used by `deleted`).
    Removed,
    /// Further differences below this key.
    Nested(DiffTree<'a>),
}

/// Differences keyed by map key or array index.
pub type DiffTree<'a> = BTreeMap<PathKey<'a>, DiffNode<'a>>;

/// The three-way partition of a partial diff.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueDiff<'a> {
    pub added: DiffTree<'a>,
    pub deleted: DiffTree<'a>,
    pub updated: DiffTree<'a>,
}

impl<'a> ValueDiff<'a> {
    /// Returns true if no bucket holds anything.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.deleted.is_empty() && self.updated.is_empty()
    }

    /// True when the diff is nothing but appended array elements or new keys.
    pub fn is_pure_addition(&self) -> bool {
        !self.added.is_empty() && self.deleted.is_empty() && self.updated.is_empty()
    }

    /// Fold the result of comparing one child slot into this diff.
    fn record(&mut self, key: PathKey<'a>, slot: SlotDiff<'a>) {
        match slot {
            SlotDiff::Unchanged => {}
            SlotDiff::Replaced(value) => {
                self.updated.insert(key, DiffNode::Value(value));
            }
            SlotDiff::Partial(child) => {
                if !child.added.is_empty() {
                    self.added.insert(key, DiffNode::Nested(child.added));
                }
                if !child.deleted.is_empty() {
                    self.deleted.insert(key, DiffNode::Nested(child.deleted));
                }
                if !child.updated.is_empty() {
                    self.updated.insert(key, DiffNode::Nested(child.updated));
                }
            }
        }
    }
}

/// Outcome of comparing a single slot.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotDiff<'a> {
    /// Both sides are structurally equal.
    Unchanged,
    /// The whole slot was replaced by this value: unequal scalars, or a
    /// shape mismatch such as scalar versus map.
    Replaced(&'a Value),
    /// Both sides are maps, or both arrays, with differences inside.
    Partial(ValueDiff<'a>),
}

impl SlotDiff<'_> {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, SlotDiff::Unchanged)
    }
}

/// Compare two values occupying the same slot.
///
/// Equality is structural, so two independently built but identical values
/// never produce a diff. Values of different [`Shape`](crate::Shape) are never diffed
/// partially; the updated value replaces the slot wholesale.
pub fn diff_value<'a>(original: &'a Value, updated: &'a Value) -> SlotDiff<'a> {
    if original == updated {
        return SlotDiff::Unchanged;
    }
    match (original, updated) {
        (Value::Object(before), Value::Object(after)) => SlotDiff::Partial(diff_maps(before, after)),
        (Value::Array(before), Value::Array(after)) => SlotDiff::Partial(diff_arrays(before, after)),
        _ => SlotDiff::Replaced(updated),
    }
}

fn diff_maps<'a>(original: &'a Map<String, Value>, updated: &'a Map<String, Value>) -> ValueDiff<'a> {
    let mut diff = ValueDiff::default();

    for (key, after) in updated {
        match original.get(key) {
            None => {
                diff.added.insert(PathKey::Field(key), DiffNode::Value(after));
            }
            Some(before) => diff.record(PathKey::Field(key), diff_value(before, after)),
        }
    }

    // Presence of the key is the signal; the old value stays in `original`.
    for key in original.keys() {
        if !updated.contains_key(key) {
            diff.deleted.insert(PathKey::Field(key), DiffNode::Removed);
        }
    }

    diff
}

/// Index-wise array diff.
///
/// Elements past the end of the shorter array are added or deleted. When
/// every shared index compares equal and the updated array is longer, the
/// result holds only the appended elements in `added`, so growing a list
/// never clutters `updated`.
fn diff_arrays<'a>(original: &'a [Value], updated: &'a [Value]) -> ValueDiff<'a> {
    let mut diff = ValueDiff::default();
    let shared = original.len().min(updated.len());

    for (index, (before, after)) in original.iter().zip(updated).enumerate() {
        diff.record(PathKey::Index(index), diff_value(before, after));
    }
    for (index, after) in updated.iter().enumerate().skip(shared) {
        diff.added.insert(PathKey::Index(index), DiffNode::Value(after));
    }
    for index in shared..original.len() {
        diff.deleted.insert(PathKey::Index(index), DiffNode::Removed);
    }

    diff
}

/// Follow `path` into `root`, returning the value found there.
///
/// Returns `None` when a step names a missing key, an out-of-range index,
/// or tries to descend into a value of the wrong shape.
pub fn value_at<'v>(root: &'v Value, path: &[PathKey<'_>]) -> Option<&'v Value> {
    path.iter().try_fold(root, |current, step| match (step, current) {
        (PathKey::Field(name), Value::Object(map)) => map.get(*name),
        (PathKey::Index(index), Value::Array(items)) => items.get(*index),
        _ => None,
    })
}
