//! Fixtures every seeded stub starts with.

use crate::state::{
    IdentifierCheck, IdentifierTypeRecord, LocationRecord, NameRecord, PersonRecord,
    PrivilegeRecord, RoleRecord, Store, UserRecord, VisitTypeRecord,
};
use chrono::NaiveDate;
use omrs_identifiers::LETTER_HYPHEN_SEVEN_DIGITS;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "Admin123";
pub const CLERK_USERNAME: &str = "clerk";
pub const CLERK_PASSWORD: &str = "Clerk123";

pub const OUTPATIENT_CLINIC_UUID: &str = "44c3efb0-2583-4c80-a79e-1f756a03c0a1";
pub const INPATIENT_WARD_UUID: &str = "ba685651-ed3b-4e63-9b35-78893060758a";
pub const OPENMRS_ID_TYPE_UUID: &str = "05a29f94-c0ed-11e2-94be-8c13b969e334";
pub const OLD_ID_TYPE_UUID: &str = "8d79403a-c2cc-11de-8d13-0010c6dffd0f";

const FACILITY_VISIT_UUID: &str = "7b0f5697-27e3-40c4-8bae-f4049abfb4ed";
const HOME_VISIT_UUID: &str = "d66e9fe0-7d51-4801-a550-5d462ad1c944";
const SYSTEM_DEVELOPER_UUID: &str = "8d94f280-c2cc-11de-8d13-0010c6dffd0f";
const CLERK_ROLE_UUID: &str = "d8ddab2c-20a5-4a3c-b209-856c7fe839cd";
const ADMIN_UUID: &str = "45ce6c2e-dd5a-11e6-9d9c-0242ac150002";
const CLERK_UUID: &str = "a4c1f3b2-5d7e-4f10-9a8b-3c2d1e0f9a7b";

pub(crate) const ADD_PATIENTS: &str = "Add Patients";
pub(crate) const ADD_VISITS: &str = "Add Visits";
pub(crate) const ADD_PEOPLE: &str = "Add People";
pub(crate) const MANAGE_USERS: &str = "Manage Users";
pub(crate) const MANAGE_ROLES: &str = "Manage Roles";
pub(crate) const MANAGE_LOCATIONS: &str = "Manage Locations";

const PRIVILEGES: &[(&str, &str)] = &[
    (ADD_PATIENTS, "7e2f1c4a-0b3d-4e5f-8a9b-1c2d3e4f5a01"),
    (ADD_VISITS, "7e2f1c4a-0b3d-4e5f-8a9b-1c2d3e4f5a02"),
    (ADD_PEOPLE, "7e2f1c4a-0b3d-4e5f-8a9b-1c2d3e4f5a03"),
    ("Get Patients", "7e2f1c4a-0b3d-4e5f-8a9b-1c2d3e4f5a04"),
    ("Get Visits", "7e2f1c4a-0b3d-4e5f-8a9b-1c2d3e4f5a05"),
    ("Get People", "7e2f1c4a-0b3d-4e5f-8a9b-1c2d3e4f5a06"),
    ("Get Locations", "7e2f1c4a-0b3d-4e5f-8a9b-1c2d3e4f5a07"),
    (MANAGE_LOCATIONS, "7e2f1c4a-0b3d-4e5f-8a9b-1c2d3e4f5a08"),
    (MANAGE_USERS, "7e2f1c4a-0b3d-4e5f-8a9b-1c2d3e4f5a09"),
    (MANAGE_ROLES, "7e2f1c4a-0b3d-4e5f-8a9b-1c2d3e4f5a10"),
];

pub(crate) fn seeded_store() -> Store {
    let mut store = Store::default();

    for (uuid, name, description) in [
        (OUTPATIENT_CLINIC_UUID, "Outpatient Clinic", "General outpatient clinic"),
        (INPATIENT_WARD_UUID, "Inpatient Ward", "Adult inpatient ward"),
    ] {
        store.locations.insert(
            uuid.into(),
            LocationRecord {
                uuid: uuid.into(),
                name: name.into(),
                description: description.into(),
                retired: false,
                retire_reason: None,
            },
        );
    }

    store.identifier_types.insert(
        OPENMRS_ID_TYPE_UUID.into(),
        IdentifierTypeRecord {
            uuid: OPENMRS_ID_TYPE_UUID.into(),
            name: "OpenMRS ID".into(),
            description: "OpenMRS patient identifier, with check-digit".into(),
            required: true,
            check: IdentifierCheck::LuhnMod30,
        },
    );
    store.identifier_types.insert(
        OLD_ID_TYPE_UUID.into(),
        IdentifierTypeRecord {
            uuid: OLD_ID_TYPE_UUID.into(),
            name: "Old Identification Number".into(),
            description: "Number given out prior to the OpenMRS system".into(),
            required: false,
            check: IdentifierCheck::Format(LETTER_HYPHEN_SEVEN_DIGITS.into()),
        },
    );

    for (uuid, name, description) in [
        (FACILITY_VISIT_UUID, "Facility Visit", "Patient visits the clinic"),
        (HOME_VISIT_UUID, "Home Visit", "Clinician visits the patient"),
    ] {
        store.visit_types.insert(
            uuid.into(),
            VisitTypeRecord {
                uuid: uuid.into(),
                name: name.into(),
                description: description.into(),
            },
        );
    }

    for (name, uuid) in PRIVILEGES {
        store.privileges.insert(
            (*uuid).into(),
            PrivilegeRecord {
                uuid: (*uuid).into(),
                name: (*name).into(),
            },
        );
    }

    let all: Vec<String> = PRIVILEGES.iter().map(|(n, _)| (*n).to_owned()).collect();
    let clerk: Vec<String> = all
        .iter()
        .filter(|p| p.as_str() != ADD_PATIENTS && p.as_str() != ADD_VISITS)
        .cloned()
        .collect();
    store.roles.insert(
        SYSTEM_DEVELOPER_UUID.into(),
        RoleRecord {
            uuid: SYSTEM_DEVELOPER_UUID.into(),
            name: "System Developer".into(),
            description: "Developers of the OpenMRS system".into(),
            privileges: all,
        },
    );
    store.roles.insert(
        CLERK_ROLE_UUID.into(),
        RoleRecord {
            uuid: CLERK_ROLE_UUID.into(),
            name: "Clerk".into(),
            description: "Front desk, read-only on clinical data".into(),
            privileges: clerk,
        },
    );

    seed_user(
        &mut store,
        ADMIN_UUID,
        (ADMIN_USERNAME, ADMIN_PASSWORD),
        ("Super", "User"),
        SYSTEM_DEVELOPER_UUID,
    );
    seed_user(
        &mut store,
        CLERK_UUID,
        (CLERK_USERNAME, CLERK_PASSWORD),
        ("Clara", "Clerk"),
        CLERK_ROLE_UUID,
    );

    store.session_location = Some(OUTPATIENT_CLINIC_UUID.into());
    store
}

fn seed_user(
    store: &mut Store,
    uuid: &str,
    (username, password): (&str, &str),
    (given, family): (&str, &str),
    role_uuid: &str,
) {
    let person_uuid = crate::state::new_uuid();
    store.persons.insert(
        person_uuid.clone(),
        PersonRecord {
            uuid: person_uuid.clone(),
            names: vec![NameRecord {
                uuid: crate::state::new_uuid(),
                given_name: given.into(),
                middle_name: None,
                family_name: family.into(),
            }],
            gender: "M".into(),
            birthdate: NaiveDate::from_ymd_opt(1980, 1, 1),
            addresses: Vec::new(),
        },
    );
    store.users.insert(
        uuid.into(),
        UserRecord {
            uuid: uuid.into(),
            username: username.into(),
            password: password.into(),
            system_id: format!("{username}-1"),
            person_uuid,
            roles: vec![role_uuid.into()],
            retired: false,
            retire_reason: None,
        },
    );
}
