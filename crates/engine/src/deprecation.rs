//! Deprecation lifecycle of an entry kept under the same name.

use crate::dictionary::Entry;

/// How the `deprecated` flag moved between two versions of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Not deprecated before, deprecated now.
    Deprecated,
    /// Deprecated before, not anymore.
    Reverted,
    /// The flag did not move.
    Steady,
}

/// Compare the `deprecated` flag of two versions of the same entry.
///
/// An absent or non-boolean flag reads as `false`.
pub fn lifecycle(original: &Entry<'_>, updated: &Entry<'_>) -> Lifecycle {
    match (original.is_deprecated(), updated.is_deprecated()) {
        (false, true) => Lifecycle::Deprecated,
        (true, false) => Lifecycle::Reverted,
        _ => Lifecycle::Steady,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::Dictionary;
    use serde_json::json;

    fn transition(before: serde_json::Value, after: serde_json::Value) -> Lifecycle {
        let original = Dictionary::try_from(json!({ "t": before })).unwrap();
        let updated = Dictionary::try_from(json!({ "t": after })).unwrap();
        lifecycle(&original.get("t").unwrap(), &updated.get("t").unwrap())
    }

    #[test]
    fn absent_to_true_is_deprecated() {
        assert_eq!(
            transition(json!({"value": 1}), json!({"value": 1, "deprecated": true})),
            Lifecycle::Deprecated
        );
    }

    #[test]
    fn false_to_true_is_deprecated() {
        assert_eq!(
            transition(json!({"deprecated": false}), json!({"deprecated": true})),
            Lifecycle::Deprecated
        );
    }

    #[test]
    fn true_to_absent_is_reverted() {
        assert_eq!(
            transition(json!({"deprecated": true}), json!({})),
            Lifecycle::Reverted
        );
        assert_eq!(
            transition(json!({"deprecated": true}), json!({"deprecated": false})),
            Lifecycle::Reverted
        );
    }

    #[test]
    fn unchanged_flag_is_steady() {
        assert_eq!(
            transition(json!({"deprecated": true, "value": 1}), json!({"deprecated": true, "value": 2})),
            Lifecycle::Steady
        );
        assert_eq!(transition(json!({}), json!({"deprecated": false})), Lifecycle::Steady);
    }

    #[test]
    fn non_boolean_flag_reads_as_false() {
        assert_eq!(
            transition(json!({"deprecated": "true"}), json!({"deprecated": true})),
            Lifecycle::Deprecated
        );
    }
}
