//! Token dictionaries and read-only views of their entries.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::error::DictionaryError;
use crate::shape::Shape;

/// Field holding the stable identifier that survives renames.
pub const IDENTIFIER_FIELD: &str = "uuid";
/// Boolean field marking an entry as deprecated.
pub const DEPRECATED_FIELD: &str = "deprecated";
/// Free-text explanation accompanying a deprecation.
pub const DEPRECATED_COMMENT_FIELD: &str = "deprecated_comment";
/// Forward pointer recorded on an entry that has a replacement name.
pub const RENAMED_FIELD: &str = "renamed";

/// A snapshot of named entries.
///
/// Every entry is a JSON object; this is checked once at construction so the
/// diff never has to. Entries are kept sorted by name, which makes every
/// walk over a dictionary deterministic.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub struct Dictionary {
    entries: BTreeMap<String, Value>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dictionary from a JSON object of entries.
    pub fn from_map(map: Map<String, Value>) -> Result<Self, DictionaryError> {
        let mut dictionary = Dictionary::new();
        for (name, entry) in map {
            dictionary.insert(name, entry)?;
        }
        Ok(dictionary)
    }

    /// Insert an entry, returning the entry it replaced.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        entry: Value,
    ) -> Result<Option<Value>, DictionaryError> {
        let name = name.into();
        if !entry.is_object() {
            return Err(DictionaryError::EntryNotAMap {
                found: Shape::of(&entry),
                name,
            });
        }
        Ok(self.entries.insert(name, entry))
    }

    /// Move every entry of `other` into this dictionary.
    ///
    /// Returns the names that already existed here; their entries are
    /// overwritten by the incoming ones.
    pub fn merge(&mut self, other: Dictionary) -> Vec<String> {
        let mut collisions = Vec::new();
        for (name, entry) in other.entries {
            if self.entries.contains_key(&name) {
                collisions.push(name.clone());
            }
            self.entries.insert(name, entry);
        }
        collisions
    }

    pub fn get(&self, name: &str) -> Option<Entry<'_>> {
        self.entries
            .get_key_value(name)
            .map(|(name, value)| Entry { name, value })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Entry names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries in name order.
    pub fn entries(&self) -> impl Iterator<Item = Entry<'_>> {
        self.entries.iter().map(|(name, value)| Entry { name, value })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TryFrom<Value> for Dictionary {
    type Error = DictionaryError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Dictionary::from_map(map),
            other => Err(DictionaryError::NotAMap {
                found: Shape::of(&other),
            }),
        }
    }
}

impl Serialize for Dictionary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

/// A borrowed view of one dictionary entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entry<'a> {
    name: &'a str,
    value: &'a Value,
}

impl<'a> Entry<'a> {
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// The full entry object, as compared by the diff.
    pub fn value(&self) -> &'a Value {
        self.value
    }

    /// The stable identifier, if the entry carries a string `uuid`.
    pub fn identifier(&self) -> Option<&'a str> {
        self.value.get(IDENTIFIER_FIELD).and_then(Value::as_str)
    }

    /// Whether the entry is marked deprecated. Absent or non-boolean reads
    /// as not deprecated.
    pub fn is_deprecated(&self) -> bool {
        self.value
            .get(DEPRECATED_FIELD)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn deprecated_comment(&self) -> Option<&'a str> {
        self.value.get(DEPRECATED_COMMENT_FIELD).and_then(Value::as_str)
    }

    /// The replacement name this entry points at, if any.
    pub fn renamed_to(&self) -> Option<&'a str> {
        self.value.get(RENAMED_FIELD).and_then(Value::as_str)
    }
}
