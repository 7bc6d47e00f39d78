//! Locations, identifier types, visit types and the session.

use super::{limit, rep, Params};
use crate::auth::{authenticate, require_privilege};
use crate::error::{ApiError, ApiResult};
use crate::repr::{self, Rep};
use crate::seed::MANAGE_LOCATIONS;
use crate::state::StubState;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::{json, Value};

pub(crate) async fn list_locations(
    State(state): State<StubState>,
    headers: HeaderMap,
    Query(params): Query<Params>,
) -> ApiResult<Json<Value>> {
    let store = state.store.read().await;
    authenticate(&store, &headers)?;
    let include_all = params.get("includeAll").is_some_and(|v| v == "true");
    let items = store
        .locations
        .values()
        .filter(|l| include_all || !l.retired)
        .take(limit(&params))
        .map(|l| repr::location(l, rep(&params)))
        .collect();
    Ok(Json(repr::results(items)))
}

pub(crate) async fn get_location(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(uuid): Path<String>,
    Query(params): Query<Params>,
) -> ApiResult<Json<Value>> {
    let store = state.store.read().await;
    authenticate(&store, &headers)?;
    let location = store
        .locations
        .get(&uuid)
        .ok_or_else(|| ApiError::not_found(format!("Location {uuid} not found")))?;
    Ok(Json(repr::location(location, rep(&params))))
}

/// `DELETE /location/{uuid}?reason=...` retires the location.
pub(crate) async fn retire_location(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(uuid): Path<String>,
    Query(params): Query<Params>,
) -> ApiResult<StatusCode> {
    let mut store = state.store.write().await;
    let user = authenticate(&store, &headers)?.clone();
    require_privilege(&store, &user, MANAGE_LOCATIONS)?;

    let reason = params
        .get("reason")
        .filter(|r| !r.trim().is_empty())
        .cloned()
        .ok_or_else(|| ApiError::bad_request("reason is required to retire a location"))?;
    let location = store
        .locations
        .get_mut(&uuid)
        .ok_or_else(|| ApiError::not_found(format!("Location {uuid} not found")))?;
    location.retired = true;
    location.retire_reason = Some(reason);
    tracing::info!("retired location {uuid}");
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn list_identifier_types(
    State(state): State<StubState>,
    headers: HeaderMap,
    Query(params): Query<Params>,
) -> ApiResult<Json<Value>> {
    let store = state.store.read().await;
    authenticate(&store, &headers)?;
    let items = store
        .identifier_types
        .values()
        .map(|t| repr::identifier_type(t, rep(&params)))
        .collect();
    Ok(Json(repr::results(items)))
}

pub(crate) async fn list_visit_types(
    State(state): State<StubState>,
    headers: HeaderMap,
    Query(params): Query<Params>,
) -> ApiResult<Json<Value>> {
    let store = state.store.read().await;
    authenticate(&store, &headers)?;
    let items = store
        .visit_types
        .values()
        .map(|t| repr::visit_type(t, rep(&params)))
        .collect();
    Ok(Json(repr::results(items)))
}

/// `GET /appui/session`: who is logged in and at which location.
pub(crate) async fn session(
    State(state): State<StubState>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    let store = state.store.read().await;
    let user = authenticate(&store, &headers)?;
    let location = store
        .session_location
        .as_ref()
        .and_then(|uuid| store.locations.get(uuid))
        .map(|l| repr::location(l, Rep::Ref))
        .unwrap_or(Value::Null);
    Ok(Json(json!({
        "authenticated": true,
        "user": repr::user(&store, user, Rep::Ref),
        "sessionLocation": location,
    })))
}
