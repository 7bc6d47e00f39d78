//! JSON representations (`v=ref`, `v=default`, `v=full`) of stored records.

use crate::state::{
    IdentifierTypeRecord, LocationRecord, PatientRecord, PersonRecord, PrivilegeRecord,
    RoleRecord, Store, UserRecord, VisitRecord, VisitTypeRecord,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rep {
    Ref,
    Default,
    Full,
}

impl Rep {
    pub fn from_query(v: Option<&str>) -> Self {
        match v {
            Some("full") => Rep::Full,
            Some("ref") => Rep::Ref,
            _ => Rep::Default,
        }
    }
}

pub(crate) fn results(items: Vec<Value>) -> Value {
    json!({ "results": items })
}

fn datetime(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3f+0000").to_string()
}

fn birthdate(date: NaiveDate) -> String {
    format!("{}T00:00:00.000+0000", date.format("%Y-%m-%d"))
}

fn reference(uuid: &str, display: &str) -> Value {
    json!({ "uuid": uuid, "display": display })
}

pub(crate) fn location(record: &LocationRecord, rep: Rep) -> Value {
    if rep == Rep::Ref {
        return reference(&record.uuid, &record.name);
    }
    let mut value = json!({
        "uuid": record.uuid,
        "display": record.name,
        "name": record.name,
        "description": record.description,
        "retired": record.retired,
    });
    if rep == Rep::Full {
        value["retireReason"] = json!(record.retire_reason);
    }
    value
}

pub(crate) fn identifier_type(record: &IdentifierTypeRecord, rep: Rep) -> Value {
    if rep == Rep::Ref {
        return reference(&record.uuid, &record.name);
    }
    json!({
        "uuid": record.uuid,
        "display": record.name,
        "name": record.name,
        "description": record.description,
        "required": record.required,
        "format": record.format(),
        "validator": record.validator(),
        "retired": false,
    })
}

pub(crate) fn visit_type(record: &VisitTypeRecord, rep: Rep) -> Value {
    if rep == Rep::Ref {
        return reference(&record.uuid, &record.name);
    }
    json!({
        "uuid": record.uuid,
        "display": record.name,
        "name": record.name,
        "description": record.description,
        "retired": false,
    })
}

fn privilege(record: &PrivilegeRecord) -> Value {
    json!({ "uuid": record.uuid, "display": record.name, "name": record.name })
}

fn privilege_by_name(store: &Store, name: &str) -> Value {
    store
        .privileges
        .values()
        .find(|p| p.name == name)
        .map(privilege)
        .unwrap_or_else(|| json!({ "display": name, "name": name }))
}

pub(crate) fn role(store: &Store, record: &RoleRecord, rep: Rep) -> Value {
    if rep == Rep::Ref {
        return reference(&record.uuid, &record.name);
    }
    let privileges: Vec<Value> = record
        .privileges
        .iter()
        .map(|name| privilege_by_name(store, name))
        .collect();
    json!({
        "uuid": record.uuid,
        "display": record.name,
        "name": record.name,
        "description": record.description,
        "privileges": privileges,
        "retired": false,
    })
}

pub(crate) fn person(record: &PersonRecord, rep: Rep) -> Value {
    let display = record.display();
    if rep == Rep::Ref {
        return reference(&record.uuid, &display);
    }
    let preferred = record.preferred_name();
    let mut value = json!({
        "uuid": record.uuid,
        "display": display,
        "gender": record.gender,
        "birthdate": record.birthdate.map(birthdate),
        "dead": false,
        "voided": false,
    });
    match rep {
        Rep::Full => {
            let names: Vec<Value> = record
                .names
                .iter()
                .enumerate()
                .map(|(i, n)| {
                    json!({
                        "uuid": n.uuid,
                        "display": n.display(),
                        "givenName": n.given_name,
                        "middleName": n.middle_name,
                        "familyName": n.family_name,
                        "preferred": i == 0,
                        "voided": false,
                    })
                })
                .collect();
            let addresses: Vec<Value> = record
                .addresses
                .iter()
                .map(|a| {
                    json!({
                        "uuid": a.uuid,
                        "address1": a.address1,
                        "cityVillage": a.city_village,
                        "country": a.country,
                    })
                })
                .collect();
            value["preferredName"] = names.first().cloned().unwrap_or(Value::Null);
            value["names"] = Value::Array(names);
            value["addresses"] = Value::Array(addresses);
        }
        _ => {
            // The default representation only carries a reference to the preferred name.
            value["preferredName"] = preferred
                .map(|n| reference(&n.uuid, &n.display()))
                .unwrap_or(Value::Null);
        }
    }
    value
}

pub(crate) fn patient(store: &Store, record: &PatientRecord, rep: Rep) -> Value {
    let person_record = store.persons.get(&record.uuid);
    let name = person_record.map(PersonRecord::display).unwrap_or_default();
    let preferred_id = record
        .identifiers
        .iter()
        .find(|i| i.preferred)
        .or_else(|| record.identifiers.first())
        .map(|i| i.identifier.clone())
        .unwrap_or_default();
    let display = format!("{preferred_id} - {name}");
    if rep == Rep::Ref {
        return reference(&record.uuid, &display);
    }

    let identifiers: Vec<Value> = record
        .identifiers
        .iter()
        .map(|i| {
            let type_name = store
                .identifier_types
                .get(&i.type_uuid)
                .map(|t| t.name.as_str())
                .unwrap_or_default();
            let location_name = store
                .locations
                .get(&i.location_uuid)
                .map(|l| l.name.as_str())
                .unwrap_or_default();
            json!({
                "uuid": i.uuid,
                "display": format!("{type_name} = {}", i.identifier),
                "identifier": i.identifier,
                "identifierType": reference(&i.type_uuid, type_name),
                "location": reference(&i.location_uuid, location_name),
                "preferred": i.preferred,
                "voided": false,
            })
        })
        .collect();

    json!({
        "uuid": record.uuid,
        "display": display,
        "identifiers": identifiers,
        "person": person_record.map(|p| person(p, rep)).unwrap_or(Value::Null),
        "voided": false,
    })
}

pub(crate) fn visit(store: &Store, record: &VisitRecord, rep: Rep) -> Value {
    let patient_display = store
        .patients
        .get(&record.patient_uuid)
        .map(|p| patient(store, p, Rep::Ref)["display"].clone())
        .unwrap_or(Value::Null);
    let visit_type_name = store
        .visit_types
        .get(&record.visit_type_uuid)
        .map(|t| t.name.clone())
        .unwrap_or_default();
    let location_ref = record
        .location_uuid
        .as_ref()
        .and_then(|uuid| store.locations.get(uuid))
        .map(|l| location(l, Rep::Ref))
        .unwrap_or(Value::Null);
    let display = format!("{visit_type_name} @ {}", datetime(record.start));
    if rep == Rep::Ref {
        return reference(&record.uuid, &display);
    }
    json!({
        "uuid": record.uuid,
        "display": display,
        "patient": { "uuid": record.patient_uuid, "display": patient_display },
        "visitType": reference(&record.visit_type_uuid, &visit_type_name),
        "location": location_ref,
        "startDatetime": datetime(record.start),
        "stopDatetime": record.stop.map(datetime),
        "indication": record.indication,
        "encounters": [],
        "attributes": [],
        "voided": false,
    })
}

pub(crate) fn user(store: &Store, record: &UserRecord, rep: Rep) -> Value {
    if rep == Rep::Ref {
        return reference(&record.uuid, &record.username);
    }
    let person_ref = store
        .persons
        .get(&record.person_uuid)
        .map(|p| person(p, Rep::Ref))
        .unwrap_or(Value::Null);
    let role_rep = if rep == Rep::Full { Rep::Full } else { Rep::Ref };
    let roles: Vec<Value> = record
        .roles
        .iter()
        .filter_map(|uuid| store.roles.get(uuid))
        .map(|r| role(store, r, role_rep))
        .collect();
    let privileges: Vec<Value> = store
        .user_privileges(record)
        .into_iter()
        .map(|name| privilege_by_name(store, name))
        .collect();
    let mut value = json!({
        "uuid": record.uuid,
        "display": record.username,
        "username": record.username,
        "systemId": record.system_id,
        "person": person_ref,
        "roles": roles,
        "retired": record.retired,
    });
    if rep == Rep::Full {
        value["privileges"] = Value::Array(privileges);
        value["retireReason"] = json!(record.retire_reason);
    }
    value
}
