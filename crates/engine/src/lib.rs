//! tokendiff-engine: structural diff and change classification for design
//! token dictionaries.
//!
//! A dictionary maps entry names to JSON objects. Comparing two snapshots
//! yields a [`DiffResult`] in which every differing entry lands in exactly
//! one bucket: renamed, deprecated, reverted, added, deleted or updated.
//!
//! # Public API
//!
//! - [`diff_dictionaries()`] -- classify two validated dictionaries
//! - [`diff_json()`] -- validate two parsed JSON documents, then classify
//! - [`diff_value()`] -- the generic recursive differ used for entry content
//! - [`flatten_diff()`] -- turn a nested diff into path-addressed [`Change`]s
//! - [`IdentityIndex`] / [`detect_renames()`] -- identifier tracking
//!
//! The engine performs no I/O, keeps no state between calls, and only reads
//! its inputs.

pub mod classify;
pub mod deprecation;
pub mod dictionary;
pub mod error;
pub mod flatten;
pub mod identity;
pub mod result;
pub mod shape;
pub mod tree;

// ── Convenience re-exports ───────────────────────────────────────────

pub use classify::{diff_dictionaries, diff_json};
pub use deprecation::{lifecycle, Lifecycle};
pub use dictionary::{Dictionary, Entry};
pub use error::DictionaryError;
pub use flatten::{flatten_added, flatten_deleted, flatten_diff, flatten_updated, format_path};
pub use identity::{detect_renames, DuplicateIdentifier, IdentityIndex};
pub use result::{Bucket, Change, ChangeKind, DiffResult, DiffSummary, Rename};
pub use shape::{classify, Shape};
pub use tree::{diff_value, value_at, DiffNode, DiffTree, PathKey, SlotDiff, ValueDiff};
