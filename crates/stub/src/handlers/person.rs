use super::{rep, Params};
use crate::auth::{authenticate, require_privilege};
use crate::error::{ApiError, ApiResult};
use crate::repr::{self, Rep};
use crate::seed::ADD_PEOPLE;
use crate::state::StubState;
use crate::validate::new_person;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::Value;

pub(crate) async fn create_person(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let mut store = state.store.write().await;
    let user = authenticate(&store, &headers)?.clone();
    require_privilege(&store, &user, ADD_PEOPLE)?;

    let person = new_person(Some(&body), chrono::Utc::now().date_naive())?;
    let value = repr::person(&person, Rep::Default);
    tracing::info!("created person {}", person.uuid);
    store.persons.insert(person.uuid.clone(), person);
    Ok((StatusCode::CREATED, Json(value)))
}

pub(crate) async fn get_person(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(uuid): Path<String>,
    Query(params): Query<Params>,
) -> ApiResult<Json<Value>> {
    let store = state.store.read().await;
    authenticate(&store, &headers)?;
    let person = store
        .persons
        .get(&uuid)
        .ok_or_else(|| ApiError::not_found(format!("Person {uuid} not found")))?;
    Ok(Json(repr::person(person, rep(&params))))
}
