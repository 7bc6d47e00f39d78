//! Invariants of a created or fetched visit document.

use crate::fields::{as_object, non_blank_field, reference_field};
use crate::{CheckFailure, CheckResult};
use serde_json::Value;

/// Checks a visit document against the patient, visit type and location it was created with.
///
/// References may be a bare UUID string or an object carrying `uuid`. `voided` may be absent,
/// `null` or `false`. `location` may be absent or `null`; when present it must refer to
/// `location_uuid`.
pub fn validate_visit_response(
    visit: &Value,
    patient_uuid: &str,
    visit_type_uuid: &str,
    location_uuid: &str,
) -> CheckResult {
    let root = as_object(visit, "visit")?;

    let uuid = root.get("uuid");
    if !matches!(uuid, Some(Value::String(s)) if !s.is_empty()) {
        return Err(CheckFailure::new("uuid", "a non-empty string", uuid));
    }

    match root.get("voided") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => {}
        other => return Err(CheckFailure::new("voided", "false, null or absent", other)),
    }

    reference_field(root, "", "patient", patient_uuid)?;
    reference_field(root, "", "visitType", visit_type_uuid)?;
    non_blank_field(root, "", "startDatetime")?;

    match root.get("location") {
        None | Some(Value::Null) => Ok(()),
        Some(_) => reference_field(root, "", "location", location_uuid),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(visit: &Value) -> CheckResult {
        validate_visit_response(visit, "p1", "vt1", "l1")
    }

    #[test]
    fn test_object_references_are_accepted() {
        let visit = json!({
            "uuid": "v1",
            "patient": { "uuid": "p1", "display": "Ann Lee" },
            "visitType": { "uuid": "vt1" },
            "startDatetime": "2024-05-01T10:00:00.000+0000",
            "location": { "uuid": "l1" }
        });
        assert_eq!(check(&visit), Ok(()));
    }

    #[test]
    fn test_bare_string_references_are_accepted() {
        let visit = json!({
            "uuid": "v1",
            "patient": "p1",
            "visitType": "vt1",
            "startDatetime": "2024-05-01T10:00:00Z",
            "location": "l1"
        });
        assert_eq!(check(&visit), Ok(()));
    }

    #[test]
    fn test_missing_or_null_location_is_accepted() {
        let mut visit = json!({
            "uuid": "v1",
            "patient": "p1",
            "visitType": "vt1",
            "startDatetime": "2024-05-01T10:00:00Z"
        });
        assert!(check(&visit).is_ok());
        visit["location"] = Value::Null;
        assert!(check(&visit).is_ok());
    }

    #[test]
    fn test_mismatching_location_is_rejected() {
        let visit = json!({
            "uuid": "v1",
            "patient": "p1",
            "visitType": "vt1",
            "startDatetime": "2024-05-01T10:00:00Z",
            "location": "l2"
        });
        let err = check(&visit).unwrap_err();
        assert_eq!(err.field, "location");
        assert_eq!(err.found, "\"l2\"");
    }

    #[test]
    fn test_voided_variants() {
        let mut visit = json!({
            "uuid": "v1",
            "patient": "p1",
            "visitType": "vt1",
            "startDatetime": "2024-05-01T10:00:00Z",
            "voided": null
        });
        assert!(check(&visit).is_ok());
        visit["voided"] = json!(false);
        assert!(check(&visit).is_ok());
        visit["voided"] = json!(true);
        assert_eq!(check(&visit).unwrap_err().field, "voided");
    }

    #[test]
    fn test_empty_uuid_is_rejected() {
        let visit = json!({ "uuid": "", "patient": "p1", "visitType": "vt1", "startDatetime": "x" });
        assert_eq!(check(&visit).unwrap_err().field, "uuid");
    }

    #[test]
    fn test_wrong_patient_is_rejected() {
        let visit = json!({ "uuid": "v1", "patient": { "uuid": "p9" }, "visitType": "vt1", "startDatetime": "x" });
        assert_eq!(check(&visit).unwrap_err().field, "patient");
    }

    #[test]
    fn test_wrong_visit_type_is_rejected() {
        let visit = json!({ "uuid": "v1", "patient": "p1", "visitType": 7, "startDatetime": "x" });
        assert_eq!(check(&visit).unwrap_err().field, "visitType");
    }

    #[test]
    fn test_blank_start_is_rejected() {
        let visit = json!({ "uuid": "v1", "patient": "p1", "visitType": "vt1", "startDatetime": " " });
        assert_eq!(check(&visit).unwrap_err().field, "startDatetime");
    }
}
