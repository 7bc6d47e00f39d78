use super::{rep, Params};
use crate::auth::{authenticate, require_privilege};
use crate::error::{ApiError, ApiResult};
use crate::repr::{self, Rep};
use crate::seed::ADD_VISITS;
use crate::state::{new_uuid, StubState, VisitRecord};
use crate::validate::reference_uuid;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::{DateTime, Utc};
use omrs_types::parse_rest_datetime;
use serde_json::Value;

fn datetime_field(value: Option<&Value>, field: &str) -> ApiResult<Option<DateTime<Utc>>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => parse_rest_datetime(s).map(Some).ok_or_else(|| {
            ApiError::bad_request(format!("{field} {s:?} is not a valid date-time"))
        }),
        Some(_) => Err(ApiError::bad_request(format!("{field} must be a date-time string"))),
    }
}

pub(crate) async fn create_visit(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let mut store = state.store.write().await;
    let user = authenticate(&store, &headers)?.clone();
    require_privilege(&store, &user, ADD_VISITS)?;

    let Value::Object(body) = body else {
        return Err(ApiError::bad_request("visit must be an object"));
    };

    let patient_uuid = reference_uuid(body.get("patient"))
        .filter(|uuid| !uuid.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("patient is required"))?;
    if !store.patients.contains_key(&patient_uuid) {
        return Err(ApiError::bad_request(format!(
            "patient {patient_uuid:?} not found"
        )));
    }

    let visit_type_uuid = reference_uuid(body.get("visitType"))
        .filter(|uuid| !uuid.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("visitType is required"))?;
    if !store.visit_types.contains_key(&visit_type_uuid) {
        return Err(ApiError::bad_request(format!(
            "visitType {visit_type_uuid:?} not found"
        )));
    }

    let start = datetime_field(body.get("startDatetime"), "startDatetime")?
        .ok_or_else(|| ApiError::bad_request("startDatetime is required"))?;
    let stop = datetime_field(body.get("stopDatetime"), "stopDatetime")?;
    if stop.is_some_and(|stop| stop < start) {
        return Err(ApiError::bad_request(
            "stopDatetime must not be before startDatetime",
        ));
    }

    let location_uuid = match body.get("location") {
        None | Some(Value::Null) => None,
        value => {
            let uuid = reference_uuid(value)
                .ok_or_else(|| ApiError::bad_request("location must be a location uuid"))?;
            match store.locations.get(&uuid) {
                Some(location) if !location.retired => Some(uuid),
                _ => {
                    return Err(ApiError::bad_request(format!(
                        "location {uuid:?} is not a valid location"
                    )))
                }
            }
        }
    };

    let indication = match body.get("indication") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => return Err(ApiError::bad_request("indication must be a string")),
    };

    match body.get("encounters") {
        None | Some(Value::Null) => {}
        Some(Value::Array(items)) => {
            if let Some(item) = items.first() {
                return Err(ApiError::bad_request(format!(
                    "encounter {item} not found"
                )));
            }
        }
        Some(_) => return Err(ApiError::bad_request("encounters must be a list")),
    }

    if let Some(active) = store
        .visits
        .values()
        .find(|v| v.patient_uuid == patient_uuid && v.overlaps(start, stop))
    {
        return Err(ApiError::bad_request(format!(
            "Visit overlaps with active visit {} for this patient (startDatetime)",
            active.uuid
        )));
    }

    let visit = VisitRecord {
        uuid: new_uuid(),
        patient_uuid,
        visit_type_uuid,
        location_uuid,
        start,
        stop,
        indication,
    };
    let value = repr::visit(&store, &visit, Rep::Full);
    tracing::info!("created visit {} for patient {}", visit.uuid, visit.patient_uuid);
    store.visits.insert(visit.uuid.clone(), visit);
    Ok((StatusCode::CREATED, Json(value)))
}

pub(crate) async fn get_visit(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(uuid): Path<String>,
    Query(params): Query<Params>,
) -> ApiResult<Json<Value>> {
    let store = state.store.read().await;
    authenticate(&store, &headers)?;
    let visit = store
        .visits
        .get(&uuid)
        .ok_or_else(|| ApiError::not_found(format!("Visit {uuid} not found")))?;
    Ok(Json(repr::visit(&store, visit, rep(&params))))
}
