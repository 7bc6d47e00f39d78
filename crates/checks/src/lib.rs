//! Structural checks for patient and visit documents returned by the REST API.
//!
//! The checks treat responses as untrusted JSON. Each one walks a fixed list of invariants in
//! order and stops at the first that does not hold, returning a [`CheckFailure`] naming the
//! field, what was expected and what was actually there. There is no partial or soft mode.
//!
//! All checks are pure: they never mutate the document and never perform I/O.

mod fields;
mod patient;
mod visit;

pub use patient::{validate_patient_response, OPENMRS_ID_MARKER};
pub use visit::validate_visit_response;

use serde_json::Value;

const MAX_FOUND_LEN: usize = 120;

/// The first invariant a document violated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: expected {expected}, found {found}")]
pub struct CheckFailure {
    /// Dotted path of the offending field (`person.preferredName.display`, `identifiers[0].uuid`).
    pub field: String,
    /// Human-readable expectation.
    pub expected: String,
    /// Compact rendering of the value found, or `<missing>`.
    pub found: String,
}

impl CheckFailure {
    pub(crate) fn new(
        field: impl Into<String>,
        expected: impl Into<String>,
        found: Option<&Value>,
    ) -> Self {
        Self {
            field: field.into(),
            expected: expected.into(),
            found: describe(found),
        }
    }
}

/// Type alias for check results.
pub type CheckResult<T = ()> = Result<T, CheckFailure>;

fn describe(value: Option<&Value>) -> String {
    let Some(value) = value else {
        return "<missing>".into();
    };
    let rendered = value.to_string();
    if rendered.chars().count() <= MAX_FOUND_LEN {
        return rendered;
    }
    let mut truncated: String = rendered.chars().take(MAX_FOUND_LEN).collect();
    truncated.push('…');
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_failure_message_names_field_expectation_and_value() {
        let failure = CheckFailure::new("voided", "false", Some(&json!(true)));
        assert_eq!(failure.to_string(), "voided: expected false, found true");
    }

    #[test]
    fn test_missing_value_rendering() {
        let failure = CheckFailure::new("uuid", "a string", None);
        assert_eq!(failure.found, "<missing>");
    }

    #[test]
    fn test_long_values_are_truncated() {
        let long = json!("x".repeat(500));
        let failure = CheckFailure::new("display", "short", Some(&long));
        assert!(failure.found.chars().count() <= MAX_FOUND_LEN + 1);
        assert!(failure.found.ends_with('…'));
    }
}
