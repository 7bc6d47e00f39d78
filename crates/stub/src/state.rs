//! Shared in-memory store.

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
pub(crate) struct LocationRecord {
    pub uuid: String,
    pub name: String,
    pub description: String,
    pub retired: bool,
    pub retire_reason: Option<String>,
}

/// How values of an identifier type are checked on patient creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum IdentifierCheck {
    LuhnMod30,
    Format(String),
}

#[derive(Debug, Clone)]
pub(crate) struct IdentifierTypeRecord {
    pub uuid: String,
    pub name: String,
    pub description: String,
    pub required: bool,
    pub check: IdentifierCheck,
}

impl IdentifierTypeRecord {
    pub fn format(&self) -> Option<&str> {
        match &self.check {
            IdentifierCheck::Format(f) => Some(f),
            IdentifierCheck::LuhnMod30 => None,
        }
    }

    pub fn validator(&self) -> Option<&'static str> {
        match self.check {
            IdentifierCheck::LuhnMod30 => {
                Some("org.openmrs.module.idgen.validator.LuhnMod30IdentifierValidator")
            }
            IdentifierCheck::Format(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct VisitTypeRecord {
    pub uuid: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub(crate) struct PrivilegeRecord {
    pub uuid: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub(crate) struct RoleRecord {
    pub uuid: String,
    pub name: String,
    pub description: String,
    pub privileges: Vec<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct UserRecord {
    pub uuid: String,
    pub username: String,
    pub password: String,
    pub system_id: String,
    pub person_uuid: String,
    pub roles: Vec<String>,
    pub retired: bool,
    pub retire_reason: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct NameRecord {
    pub uuid: String,
    pub given_name: String,
    pub middle_name: Option<String>,
    pub family_name: String,
}

impl NameRecord {
    pub fn display(&self) -> String {
        [Some(&self.given_name), self.middle_name.as_ref(), Some(&self.family_name)]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone)]
pub(crate) struct AddressRecord {
    pub uuid: String,
    pub address1: Option<String>,
    pub city_village: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct PersonRecord {
    pub uuid: String,
    pub names: Vec<NameRecord>,
    pub gender: String,
    pub birthdate: Option<NaiveDate>,
    pub addresses: Vec<AddressRecord>,
}

impl PersonRecord {
    pub fn preferred_name(&self) -> Option<&NameRecord> {
        self.names.first()
    }

    pub fn display(&self) -> String {
        self.preferred_name()
            .map(NameRecord::display)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct PatientIdentifierRecord {
    pub uuid: String,
    pub identifier: String,
    pub type_uuid: String,
    pub location_uuid: String,
    pub preferred: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct PatientRecord {
    pub uuid: String,
    pub identifiers: Vec<PatientIdentifierRecord>,
}

#[derive(Debug, Clone)]
pub(crate) struct VisitRecord {
    pub uuid: String,
    pub patient_uuid: String,
    pub visit_type_uuid: String,
    pub location_uuid: Option<String>,
    pub start: DateTime<Utc>,
    pub stop: Option<DateTime<Utc>>,
    pub indication: Option<String>,
}

impl VisitRecord {
    /// True if `[start, stop)` intersects this visit; an open stop extends forever.
    pub fn overlaps(&self, start: DateTime<Utc>, stop: Option<DateTime<Utc>>) -> bool {
        let starts_before_other_ends = stop.map_or(true, |stop| self.start < stop);
        let other_starts_before_end = self.stop.map_or(true, |own_stop| start < own_stop);
        starts_before_other_ends && other_starts_before_end
    }
}

/// Everything the stub knows, keyed by uuid.
#[derive(Debug, Default)]
pub(crate) struct Store {
    pub locations: BTreeMap<String, LocationRecord>,
    pub identifier_types: BTreeMap<String, IdentifierTypeRecord>,
    pub visit_types: BTreeMap<String, VisitTypeRecord>,
    pub privileges: BTreeMap<String, PrivilegeRecord>,
    pub roles: BTreeMap<String, RoleRecord>,
    pub users: BTreeMap<String, UserRecord>,
    pub persons: BTreeMap<String, PersonRecord>,
    pub patients: BTreeMap<String, PatientRecord>,
    pub visits: BTreeMap<String, VisitRecord>,
    pub session_location: Option<String>,
}

impl Store {
    pub fn user_by_username(&self, username: &str) -> Option<&UserRecord> {
        self.users.values().find(|u| u.username == username)
    }

    pub fn role_by_name(&self, name: &str) -> Option<&RoleRecord> {
        self.roles.values().find(|r| r.name.eq_ignore_ascii_case(name))
    }

    /// Privilege names granted to `user` through its roles.
    pub fn user_privileges(&self, user: &UserRecord) -> Vec<&str> {
        let mut names: Vec<&str> = user
            .roles
            .iter()
            .filter_map(|uuid| self.roles.get(uuid))
            .flat_map(|role| role.privileges.iter().map(String::as_str))
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    pub fn identifier_in_use(&self, type_uuid: &str, value: &str) -> bool {
        self.patients
            .values()
            .flat_map(|p| &p.identifiers)
            .any(|i| i.type_uuid == type_uuid && i.identifier == value)
    }
}

/// Cloneable handle to the store shared by all handlers.
#[derive(Clone)]
pub struct StubState {
    pub(crate) store: Arc<RwLock<Store>>,
}

impl StubState {
    /// A store holding the standard fixtures.
    pub fn seeded() -> Self {
        Self {
            store: Arc::new(RwLock::new(crate::seed::seeded_store())),
        }
    }
}

pub(crate) fn new_uuid() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn visit(start_h: u32, stop_h: Option<u32>) -> VisitRecord {
        VisitRecord {
            uuid: "v".into(),
            patient_uuid: "p".into(),
            visit_type_uuid: "vt".into(),
            location_uuid: None,
            start: Utc.with_ymd_and_hms(2024, 1, 1, start_h, 0, 0).unwrap(),
            stop: stop_h.map(|h| Utc.with_ymd_and_hms(2024, 1, 1, h, 0, 0).unwrap()),
            indication: None,
        }
    }

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, h, 0, 0).unwrap()
    }

    #[test]
    fn test_open_visit_overlaps_anything_later() {
        let active = visit(8, None);
        assert!(active.overlaps(at(10), None));
        assert!(active.overlaps(at(10), Some(at(11))));
        assert!(!active.overlaps(at(6), Some(at(7))));
    }

    #[test]
    fn test_closed_visit_allows_later_start() {
        let closed = visit(8, Some(9));
        assert!(!closed.overlaps(at(9), None));
        assert!(!closed.overlaps(at(10), None));
        assert!(closed.overlaps(at(7), None));
        assert!(closed.overlaps(at(8), Some(at(10))));
    }

    #[test]
    fn test_seeded_store_has_admin_with_all_privileges() {
        let store = crate::seed::seeded_store();
        let admin = store.user_by_username("admin").unwrap();
        let privileges = store.user_privileges(admin);
        assert!(privileges.contains(&"Add Patients"));
        assert!(privileges.contains(&"Add Visits"));
    }
}
