use super::{limit, rep, Params};
use crate::auth::{authenticate, require_privilege};
use crate::error::{ApiError, ApiResult};
use crate::repr::{self, Rep};
use crate::seed::ADD_PATIENTS;
use crate::state::{
    new_uuid, IdentifierCheck, PatientIdentifierRecord, PatientRecord, PersonRecord, Store,
    StubState,
};
use crate::validate::{new_person, non_blank, reference_uuid};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use omrs_identifiers::{full_match, validate_identifier};
use serde_json::{Map, Value};

const MAX_IDENTIFIER_LEN: usize = 50;

/// Resolve `person`: a reference to an existing person who is not yet a patient, or a new
/// person document.
fn resolve_person(store: &Store, value: Option<&Value>) -> ApiResult<PersonSource> {
    if let Some(Value::String(uuid)) = value {
        if !store.persons.contains_key(uuid) {
            return Err(ApiError::bad_request(format!("person {uuid:?} not found")));
        }
        if store.patients.contains_key(uuid) {
            return Err(ApiError::bad_request(format!(
                "person {uuid} is already a patient"
            )));
        }
        return Ok(PersonSource::Existing(uuid.clone()));
    }
    let person = new_person(value, chrono::Utc::now().date_naive())?;
    Ok(PersonSource::New(person))
}

enum PersonSource {
    Existing(String),
    New(PersonRecord),
}

fn parse_identifier(
    store: &Store,
    index: usize,
    entry: &Value,
) -> ApiResult<PatientIdentifierRecord> {
    let field = format!("identifiers[{index}]");
    let Value::Object(map) = entry else {
        return Err(ApiError::bad_request(format!("{field} must be an object")));
    };

    let value = non_blank(map.get("identifier")).ok_or_else(|| {
        ApiError::bad_request(format!("{field}.identifier is required and cannot be blank"))
    })?;
    if value.chars().count() > MAX_IDENTIFIER_LEN {
        return Err(ApiError::bad_request(format!(
            "{field}.identifier cannot be longer than {MAX_IDENTIFIER_LEN} characters"
        )));
    }

    let type_uuid = reference_uuid(map.get("identifierType"))
        .ok_or_else(|| ApiError::bad_request(format!("{field}.identifierType is required")))?;
    let identifier_type = store.identifier_types.get(&type_uuid).ok_or_else(|| {
        ApiError::bad_request(format!(
            "{field}.identifierType {type_uuid:?} is not a known identifier type"
        ))
    })?;

    let location_uuid = location_of(map)
        .ok_or_else(|| ApiError::bad_request(format!("{field}.location is required")))?;
    match store.locations.get(&location_uuid) {
        Some(location) if !location.retired => {}
        _ => {
            return Err(ApiError::bad_request(format!(
                "{field}.location {location_uuid:?} is not a valid location"
            )))
        }
    }

    let accepted = match &identifier_type.check {
        IdentifierCheck::LuhnMod30 => validate_identifier(value).unwrap_or(false),
        IdentifierCheck::Format(format) => full_match(format, value).unwrap_or(false),
    };
    if !accepted {
        return Err(ApiError::bad_request(format!(
            "Invalid identifier {value:?} for identifier type {}",
            identifier_type.name
        )));
    }
    if store.identifier_in_use(&type_uuid, value) {
        return Err(ApiError::bad_request(format!(
            "Identifier {value:?} is already in use by another patient"
        )));
    }

    let preferred = match map.get("preferred") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(_) => {
            return Err(ApiError::bad_request(format!(
                "{field}.preferred must be a boolean"
            )))
        }
    };

    Ok(PatientIdentifierRecord {
        uuid: new_uuid(),
        identifier: value.to_owned(),
        type_uuid,
        location_uuid,
        preferred,
    })
}

fn location_of(map: &Map<String, Value>) -> Option<String> {
    reference_uuid(map.get("location"))
}

pub(crate) async fn create_patient(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let mut store = state.store.write().await;
    let user = authenticate(&store, &headers)?.clone();
    require_privilege(&store, &user, ADD_PATIENTS)?;

    let Value::Object(body) = body else {
        return Err(ApiError::bad_request("patient must be an object"));
    };
    let person = resolve_person(&store, body.get("person"))?;

    let mut identifiers = match body.get("identifiers") {
        Some(Value::Array(items)) if !items.is_empty() => items
            .iter()
            .enumerate()
            .map(|(i, entry)| parse_identifier(&store, i, entry))
            .collect::<ApiResult<Vec<_>>>()?,
        _ => {
            return Err(ApiError::bad_request(
                "identifiers must be a non-empty list of patient identifiers",
            ))
        }
    };

    if let Some(missing) = store
        .identifier_types
        .values()
        .find(|t| t.required && !identifiers.iter().any(|i| i.type_uuid == t.uuid))
    {
        return Err(ApiError::bad_request(format!(
            "MissingRequiredIdentifierException: patient is missing the required identifier {}",
            missing.name
        )));
    }
    if !identifiers.iter().any(|i| i.preferred) {
        if let Some(first) = identifiers.first_mut() {
            first.preferred = true;
        }
    }

    let uuid = match person {
        PersonSource::Existing(uuid) => uuid,
        PersonSource::New(person) => {
            let uuid = person.uuid.clone();
            store.persons.insert(uuid.clone(), person);
            uuid
        }
    };
    let patient = PatientRecord {
        uuid: uuid.clone(),
        identifiers,
    };
    let value = repr::patient(&store, &patient, Rep::Default);
    store.patients.insert(uuid.clone(), patient);
    tracing::info!("created patient {uuid}");
    Ok((StatusCode::CREATED, Json(value)))
}

/// `GET /patient?q=...` matches identifiers exactly and names by substring.
pub(crate) async fn search_patients(
    State(state): State<StubState>,
    headers: HeaderMap,
    Query(params): Query<Params>,
) -> ApiResult<Json<Value>> {
    let store = state.store.read().await;
    authenticate(&store, &headers)?;
    let query = params
        .get("q")
        .map(|q| q.trim().to_lowercase())
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::bad_request("q is required to search patients"))?;

    let items = store
        .patients
        .values()
        .filter(|p| {
            p.identifiers
                .iter()
                .any(|i| i.identifier.to_lowercase() == query)
                || store
                    .persons
                    .get(&p.uuid)
                    .is_some_and(|person| person.display().to_lowercase().contains(&query))
        })
        .take(limit(&params))
        .map(|p| repr::patient(&store, p, rep(&params)))
        .collect();
    Ok(Json(repr::results(items)))
}

pub(crate) async fn get_patient(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(uuid): Path<String>,
    Query(params): Query<Params>,
) -> ApiResult<Json<Value>> {
    let store = state.store.read().await;
    authenticate(&store, &headers)?;
    let patient = store
        .patients
        .get(&uuid)
        .ok_or_else(|| ApiError::not_found(format!("Patient {uuid} not found")))?;
    Ok(Json(repr::patient(&store, patient, rep(&params))))
}
