use super::{limit, rep, Params};
use crate::auth::{authenticate, require_privilege};
use crate::error::{ApiError, ApiResult};
use crate::repr::{self, Rep};
use crate::seed::{MANAGE_ROLES, MANAGE_USERS};
use crate::state::{new_uuid, RoleRecord, Store, StubState, UserRecord};
use crate::validate::{new_person, non_blank, reference_uuid};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::Value;

fn find_user<'a>(store: &'a Store, id: &str) -> Option<&'a UserRecord> {
    store
        .users
        .get(id)
        .or_else(|| store.user_by_username(id))
}

/// `GET /user`. `retired=true` lists only retired users, `includeAll=true` lists everyone.
pub(crate) async fn list_users(
    State(state): State<StubState>,
    headers: HeaderMap,
    Query(params): Query<Params>,
) -> ApiResult<Json<Value>> {
    let store = state.store.read().await;
    authenticate(&store, &headers)?;

    let include_all = params.get("includeAll").is_some_and(|v| v == "true");
    let retired_only = params.get("retired").is_some_and(|v| v == "true");
    let query = params.get("q").map(|q| q.to_lowercase());

    let items = store
        .users
        .values()
        .filter(|u| include_all || u.retired == retired_only)
        .filter(|u| {
            query.as_ref().map_or(true, |q| {
                u.username.to_lowercase().contains(q)
                    || store
                        .persons
                        .get(&u.person_uuid)
                        .is_some_and(|p| p.display().to_lowercase().contains(q))
            })
        })
        .take(limit(&params))
        .map(|u| repr::user(&store, u, rep(&params)))
        .collect();
    Ok(Json(repr::results(items)))
}

/// `GET /user/{uuid-or-username}`.
pub(crate) async fn get_user(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(params): Query<Params>,
) -> ApiResult<Json<Value>> {
    let store = state.store.read().await;
    authenticate(&store, &headers)?;
    let user =
        find_user(&store, &id).ok_or_else(|| ApiError::not_found(format!("User {id} not found")))?;
    Ok(Json(repr::user(&store, user, rep(&params))))
}

pub(crate) async fn create_user(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let mut store = state.store.write().await;
    let caller = authenticate(&store, &headers)?.clone();
    require_privilege(&store, &caller, MANAGE_USERS)?;

    let Value::Object(body) = body else {
        return Err(ApiError::bad_request("user must be an object"));
    };
    let username = non_blank(body.get("username"))
        .ok_or_else(|| ApiError::bad_request("username is required"))?
        .to_owned();
    if store.user_by_username(&username).is_some() {
        return Err(ApiError::conflict(format!(
            "User with username {username} already exists"
        )));
    }
    let password = non_blank(body.get("password"))
        .ok_or_else(|| ApiError::bad_request("password is required"))?
        .to_owned();

    let roles = match body.get("roles") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                reference_uuid(Some(item))
                    .filter(|uuid| store.roles.contains_key(uuid))
                    .ok_or_else(|| ApiError::bad_request(format!("role {item} not found")))
            })
            .collect::<ApiResult<Vec<_>>>()?,
        Some(_) => return Err(ApiError::bad_request("roles must be a list")),
    };

    let person_uuid = match body.get("person") {
        Some(Value::String(uuid)) if store.persons.contains_key(uuid) => uuid.clone(),
        Some(Value::String(uuid)) => {
            return Err(ApiError::bad_request(format!("person {uuid:?} not found")))
        }
        value => {
            let person = new_person(value, chrono::Utc::now().date_naive())?;
            let uuid = person.uuid.clone();
            store.persons.insert(uuid.clone(), person);
            uuid
        }
    };

    let user = UserRecord {
        uuid: new_uuid(),
        system_id: body
            .get("systemId")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .unwrap_or_else(|| username.clone()),
        username,
        password,
        person_uuid,
        roles,
        retired: false,
        retire_reason: None,
    };
    let value = repr::user(&store, &user, Rep::Full);
    tracing::info!("created user {} ({})", user.username, user.uuid);
    store.users.insert(user.uuid.clone(), user);
    Ok((StatusCode::CREATED, Json(value)))
}

/// `DELETE /user/{uuid}`: purges with `purge=true`, otherwise retires with `reason`.
pub(crate) async fn delete_user(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(params): Query<Params>,
) -> ApiResult<StatusCode> {
    let mut store = state.store.write().await;
    let caller = authenticate(&store, &headers)?.clone();
    require_privilege(&store, &caller, MANAGE_USERS)?;

    let uuid = find_user(&store, &id)
        .map(|u| u.uuid.clone())
        .ok_or_else(|| ApiError::not_found(format!("User {id} not found")))?;

    if params.get("purge").is_some_and(|v| v == "true") {
        store.users.remove(&uuid);
        tracing::info!("purged user {uuid}");
        return Ok(StatusCode::NO_CONTENT);
    }

    let reason = params
        .get("reason")
        .filter(|r| !r.trim().is_empty())
        .cloned()
        .unwrap_or_else(|| "Retired via REST".to_owned());
    if let Some(user) = store.users.get_mut(&uuid) {
        user.retired = true;
        user.retire_reason = Some(reason);
    }
    tracing::info!("retired user {uuid}");
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn list_roles(
    State(state): State<StubState>,
    headers: HeaderMap,
    Query(params): Query<Params>,
) -> ApiResult<Json<Value>> {
    let store = state.store.read().await;
    authenticate(&store, &headers)?;
    let items = store
        .roles
        .values()
        .take(limit(&params))
        .map(|r| repr::role(&store, r, rep(&params)))
        .collect();
    Ok(Json(repr::results(items)))
}

pub(crate) async fn get_role(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(uuid): Path<String>,
    Query(params): Query<Params>,
) -> ApiResult<Json<Value>> {
    let store = state.store.read().await;
    authenticate(&store, &headers)?;
    let role = store
        .roles
        .get(&uuid)
        .ok_or_else(|| ApiError::not_found(format!("Role {uuid} not found")))?;
    Ok(Json(repr::role(&store, role, rep(&params))))
}

/// Resolve a privilege given by name, `{"name": ...}` or `{"uuid": ...}`.
fn privilege_name(store: &Store, item: &Value) -> Option<String> {
    let key = item
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .or_else(|| reference_uuid(Some(item)))?;
    store
        .privileges
        .values()
        .find(|p| p.name == key || p.uuid == key)
        .map(|p| p.name.clone())
}

pub(crate) async fn create_role(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let mut store = state.store.write().await;
    let caller = authenticate(&store, &headers)?.clone();
    require_privilege(&store, &caller, MANAGE_ROLES)?;

    let name = non_blank(body.get("name"))
        .ok_or_else(|| ApiError::bad_request("role name is required"))?
        .to_owned();
    if store.role_by_name(&name).is_some() {
        return Err(ApiError::bad_request(format!(
            "role name {name:?} is already in use"
        )));
    }
    let description = match body.get("description") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(_) => return Err(ApiError::bad_request("description must be a string")),
    };
    let privileges = match body.get("privileges") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                privilege_name(&store, item)
                    .ok_or_else(|| ApiError::bad_request(format!("privilege {item} not found")))
            })
            .collect::<ApiResult<Vec<_>>>()?,
        Some(_) => return Err(ApiError::bad_request("privileges must be a list")),
    };

    let role = RoleRecord {
        uuid: new_uuid(),
        name,
        description,
        privileges,
    };
    let value = repr::role(&store, &role, Rep::Full);
    tracing::info!("created role {} ({})", role.name, role.uuid);
    store.roles.insert(role.uuid.clone(), role);
    Ok((StatusCode::CREATED, Json(value)))
}
