//! Flatten nested diff trees into path-addressed [`Change`] records.

use serde_json::Value;

use crate::result::{Change, ChangeKind};
use crate::tree::{value_at, DiffNode, DiffTree, PathKey, ValueDiff};

/// Join a base path and key steps: `a.b`, `a[0]`, `a[0].b`.
///
/// A key that is empty or contains `.`, `[`, `]` or `"` is written as a
/// quoted subscript (`a["b.c"]`), so it never reads as nesting.
pub fn format_path(base: &str, steps: &[PathKey<'_>]) -> String {
    let mut path = base.to_string();
    for step in steps {
        match step {
            PathKey::Field(name) if needs_quoting(name) => {
                path.push('[');
                path.push_str(&Value::from(*name).to_string());
                path.push(']');
            }
            PathKey::Field(name) => {
                if !path.is_empty() {
                    path.push('.');
                }
                path.push_str(name);
            }
            PathKey::Index(index) => {
                path.push('[');
                path.push_str(&index.to_string());
                path.push(']');
            }
        }
    }
    path
}

fn needs_quoting(name: &str) -> bool {
    name.is_empty() || name.contains(['.', '[', ']', '"'])
}

/// Walks one diff tree, keeping the current key stack and the records
/// emitted so far.
struct Walker<'b, 'v> {
    base: &'b str,
    kind: ChangeKind,
    original: &'v Value,
    steps: Vec<PathKey<'v>>,
    changes: Vec<Change>,
}

impl<'b, 'v> Walker<'b, 'v> {
    fn run(tree: &DiffTree<'v>, kind: ChangeKind, original: &'v Value, base: &'b str) -> Vec<Change> {
        let mut walker = Walker {
            base,
            kind,
            original,
            steps: Vec::new(),
            changes: Vec::new(),
        };
        walker.walk(tree);
        walker.changes
    }

    fn walk(&mut self, tree: &DiffTree<'v>) {
        for (key, node) in tree {
            self.steps.push(*key);
            match node {
                DiffNode::Nested(child) => self.walk(child),
                DiffNode::Value(value) => self.leaf(Some(*value)),
                DiffNode::Removed => self.leaf(None),
            }
            self.steps.pop();
        }
    }

    fn leaf(&mut self, new: Option<&Value>) {
        let path = format_path(self.base, &self.steps);
        // Terminal nodes only carry the new value; the old one is looked up.
        let original = || value_at(self.original, &self.steps).cloned();
        let change = match self.kind {
            ChangeKind::Updated => Change {
                path,
                kind: ChangeKind::Updated,
                original_value: original(),
                new_value: new.cloned(),
            },
            ChangeKind::Added => Change {
                path,
                kind: ChangeKind::Added,
                original_value: None,
                new_value: new.cloned(),
            },
            ChangeKind::Deleted => Change {
                path,
                kind: ChangeKind::Deleted,
                original_value: original(),
                new_value: None,
            },
        };
        self.changes.push(change);
    }
}

/// Flatten an `updated` tree. The original value at each leaf is recovered
/// from `original`, the value the tree was computed against.
pub fn flatten_updated<'v>(tree: &DiffTree<'v>, original: &'v Value, base: &str) -> Vec<Change> {
    Walker::run(tree, ChangeKind::Updated, original, base)
}

/// Flatten an `added` tree. Added leaves have no original value.
pub fn flatten_added<'v>(tree: &DiffTree<'v>, original: &'v Value, base: &str) -> Vec<Change> {
    Walker::run(tree, ChangeKind::Added, original, base)
}

/// Flatten a `deleted` tree, recovering each removed value from `original`.
pub fn flatten_deleted<'v>(tree: &DiffTree<'v>, original: &'v Value, base: &str) -> Vec<Change> {
    Walker::run(tree, ChangeKind::Deleted, original, base)
}

/// Flatten all three trees of `diff`: updates first, then additions, then
/// deletions, each in tree order.
pub fn flatten_diff<'v>(diff: &ValueDiff<'v>, original: &'v Value) -> Vec<Change> {
    let mut changes = flatten_updated(&diff.updated, original, "");
    changes.extend(flatten_added(&diff.added, original, ""));
    changes.extend(flatten_deleted(&diff.deleted, original, ""));
    changes
}
