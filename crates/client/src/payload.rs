//! Request bodies, serialised with the camelCase wire names.

use chrono::{DateTime, Utc};
use omrs_types::{format_rest_datetime, Gender};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonName {
    pub given_name: String,
    pub family_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
}

impl PersonName {
    pub fn new(given_name: impl Into<String>, family_name: impl Into<String>) -> Self {
        Self {
            given_name: given_name.into(),
            family_name: family_name.into(),
            middle_name: None,
        }
    }

    /// Same given and family name; the middle name is ignored.
    pub(crate) fn same_as(&self, other: &PersonName) -> bool {
        self.given_name == other.given_name && self.family_name == other.family_name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub address1: String,
    #[serde(default)]
    pub city_village: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// A person, as sent on its own to `/person` or embedded in a patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub names: Vec<PersonName>,
    pub gender: String,
    /// `YYYY-MM-DD`; `None` is sent as an explicit `null`.
    pub birthdate: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<Address>,
}

impl Person {
    pub fn new(name: PersonName, gender: Gender, birthdate: Option<String>) -> Self {
        Self {
            names: vec![name],
            gender: gender.code().to_owned(),
            birthdate,
            addresses: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifierPayload {
    pub identifier: String,
    pub identifier_type: String,
    pub location: String,
    #[serde(default = "default_preferred")]
    pub preferred: bool,
}

fn default_preferred() -> bool {
    true
}

impl IdentifierPayload {
    /// A preferred identifier of `identifier_type` assigned at `location`.
    pub fn new(
        identifier: impl Into<String>,
        identifier_type: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            identifier_type: identifier_type.into(),
            location: location.into(),
            preferred: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientPayload {
    pub person: Person,
    pub identifiers: Vec<IdentifierPayload>,
}

impl PatientPayload {
    pub fn new(person: Person, identifier: IdentifierPayload) -> Self {
        Self {
            person,
            identifiers: vec![identifier],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitPayload {
    pub patient: String,
    pub visit_type: String,
    pub start_datetime: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_datetime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indication: Option<String>,
}

impl VisitPayload {
    pub fn new(
        patient: impl Into<String>,
        visit_type: impl Into<String>,
        start: DateTime<Utc>,
    ) -> Self {
        Self {
            patient: patient.into(),
            visit_type: visit_type.into(),
            start_datetime: format_rest_datetime(start),
            location: None,
            stop_datetime: None,
            indication: None,
        }
    }

    pub fn at_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn stopping_at(mut self, stop: DateTime<Utc>) -> Self {
        self.stop_datetime = Some(format_rest_datetime(stop));
        self
    }

    pub fn with_indication(mut self, indication: impl Into<String>) -> Self {
        self.indication = Some(indication.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UuidRef {
    pub uuid: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    pub username: String,
    pub password: String,
    pub system_id: String,
    pub person: Person,
    pub roles: Vec<UuidRef>,
}

impl UserPayload {
    /// The numbered demo account `user<N>` holding exactly one role.
    pub fn demo(number: u32, role_uuid: impl Into<String>) -> Self {
        Self {
            username: format!("user{number}"),
            password: "Password123".into(),
            system_id: number.to_string(),
            person: Person::new(
                PersonName::new(format!("Demo{number}"), "User"),
                Gender::Male,
                Some("1997-09-02".into()),
            ),
            roles: vec![UuidRef {
                uuid: role_uuid.into(),
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivilegeRef {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePayload {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub privileges: Vec<PrivilegeRef>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_identifier_uses_wire_names_and_prefers() {
        let value = serde_json::to_value(IdentifierPayload::new("1000X", "t1", "l1")).unwrap();
        assert_eq!(
            value,
            json!({"identifier": "1000X", "identifierType": "t1", "location": "l1", "preferred": true})
        );
    }

    #[test]
    fn test_preferred_defaults_to_true_when_absent() {
        let parsed: IdentifierPayload = serde_json::from_value(
            json!({"identifier": "1000X", "identifierType": "t1", "location": "l1"}),
        )
        .unwrap();
        assert!(parsed.preferred);
    }

    #[test]
    fn test_visit_omits_unset_optionals() {
        let start = Utc.with_ymd_and_hms(2016, 10, 8, 4, 9, 25).unwrap();
        let value = serde_json::to_value(VisitPayload::new("p", "vt", start)).unwrap();
        assert_eq!(
            value,
            json!({"patient": "p", "visitType": "vt", "startDatetime": "2016-10-08T04:09:25.000Z"})
        );

        let value = serde_json::to_value(
            VisitPayload::new("p", "vt", start)
                .at_location("l")
                .stopping_at(start)
                .with_indication("Follow-up visit"),
        )
        .unwrap();
        assert_eq!(value["location"], "l");
        assert_eq!(value["stopDatetime"], "2016-10-08T04:09:25.000Z");
        assert_eq!(value["indication"], "Follow-up visit");
    }

    #[test]
    fn test_person_sends_null_birthdate() {
        let person = Person::new(PersonName::new("Ann", "Lee"), Gender::Female, None);
        let value = serde_json::to_value(&person).unwrap();
        assert_eq!(value["birthdate"], serde_json::Value::Null);
        assert_eq!(value["gender"], "F");
        assert_eq!(value["names"][0]["givenName"], "Ann");
        assert!(value.get("addresses").is_none());
    }

    #[test]
    fn test_demo_user() {
        let value = serde_json::to_value(UserPayload::demo(200, "r1")).unwrap();
        assert_eq!(value["username"], "user200");
        assert_eq!(value["systemId"], "200");
        assert_eq!(value["roles"], json!([{"uuid": "r1"}]));
        assert_eq!(value["person"]["names"][0]["givenName"], "Demo200");
    }
}
