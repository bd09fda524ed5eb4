use crate::shape::Shape;

/// Errors raised when a JSON value cannot be used as a token dictionary.
///
/// These are boundary errors: once a [`Dictionary`](crate::Dictionary) has
/// been constructed, the diff itself never fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DictionaryError {
    /// The dictionary root is not a JSON object.
    #[error("dictionary must be a JSON object of entries, found {found}")]
    NotAMap { found: Shape },

    /// An entry under `name` is not a JSON object.
    #[error("entry '{name}' must be a JSON object, found {found}")]
    EntryNotAMap { name: String, found: Shape },
}
