//! Invariants of a freshly created or fetched patient document.

use crate::fields::{as_object, non_blank_field, object_field, str_field};
use crate::{CheckFailure, CheckResult};
use omrs_types::Gender;
use serde_json::Value;

/// Substring identifying the auto-validated identifier type in an identifier's `display`.
pub const OPENMRS_ID_MARKER: &str = "OpenMRS ID";

/// Checks a patient document, returning the first invariant it violates.
///
/// In order:
/// 1. the document is an object with a string `uuid`;
/// 2. `voided` is present and exactly `false`;
/// 3. `person` is an object whose `uuid` equals the patient's;
/// 4. `person.gender` is one of `M`, `F`, `O`, `U`;
/// 5. `person.birthdate` is a string;
/// 6. `person.preferredName` is an object with a non-blank `display`;
/// 7. `identifiers` is a non-empty array;
/// 8. at least one identifier's `display` contains `OpenMRS ID`, and each such entry carries a
///    string `uuid`.
pub fn validate_patient_response(patient: &Value) -> CheckResult {
    let root = as_object(patient, "patient")?;
    let uuid = str_field(root, "", "uuid")?;

    match root.get("voided") {
        Some(Value::Bool(false)) => {}
        other => return Err(CheckFailure::new("voided", "false", other)),
    }

    let person = object_field(root, "", "person")?;
    let person_uuid = person.get("uuid");
    if person_uuid.and_then(Value::as_str) != Some(uuid) {
        return Err(CheckFailure::new(
            "person.uuid",
            format!("{uuid:?} (the patient uuid)"),
            person_uuid,
        ));
    }

    let gender = person.get("gender");
    if gender.and_then(Value::as_str).and_then(Gender::from_code).is_none() {
        return Err(CheckFailure::new("person.gender", "one of M, F, O, U", gender));
    }

    str_field(person, "person", "birthdate")?;

    let preferred = object_field(person, "person", "preferredName")?;
    non_blank_field(preferred, "person.preferredName", "display")?;

    let identifiers = match root.get("identifiers") {
        Some(Value::Array(items)) if !items.is_empty() => items,
        other => return Err(CheckFailure::new("identifiers", "a non-empty array", other)),
    };

    let mut found_openmrs_id = false;
    for (index, entry) in identifiers.iter().enumerate() {
        let is_openmrs_id = entry
            .get("display")
            .and_then(Value::as_str)
            .is_some_and(|display| display.contains(OPENMRS_ID_MARKER));
        if !is_openmrs_id {
            continue;
        }
        found_openmrs_id = true;
        let entry_uuid = entry.get("uuid");
        if !matches!(entry_uuid, Some(Value::String(_))) {
            return Err(CheckFailure::new(
                format!("identifiers[{index}].uuid"),
                "a string",
                entry_uuid,
            ));
        }
    }

    if !found_openmrs_id {
        return Err(CheckFailure::new(
            "identifiers",
            format!("an entry whose display contains {OPENMRS_ID_MARKER:?}"),
            root.get("identifiers"),
        ));
    }

    Ok(())
}
