//! Route table and the handlers behind it.

mod metadata;
mod patient;
mod person;
mod users;
mod visit;

use crate::error::ApiError;
use crate::repr::Rep;
use crate::state::StubState;
use axum::{
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use std::collections::HashMap;

/// Query string parameters, as sent (`v`, `q`, `limit`, `reason`, ...).
pub(crate) type Params = HashMap<String, String>;

const DEFAULT_LIMIT: usize = 50;

pub(crate) fn rep(params: &Params) -> Rep {
    Rep::from_query(params.get("v").map(String::as_str))
}

pub(crate) fn limit(params: &Params) -> usize {
    params
        .get("limit")
        .and_then(|l| l.parse().ok())
        .unwrap_or(DEFAULT_LIMIT)
}

pub(crate) fn routes() -> Router<StubState> {
    Router::new()
        .route("/location", get(metadata::list_locations))
        .route(
            "/location/:uuid",
            get(metadata::get_location).delete(metadata::retire_location),
        )
        .route("/patientidentifiertype", get(metadata::list_identifier_types))
        .route("/visittype", get(metadata::list_visit_types))
        .route("/appui/session", get(metadata::session))
        .route("/person", post(person::create_person))
        .route("/person/:uuid", get(person::get_person))
        .route(
            "/patient",
            get(patient::search_patients).post(patient::create_patient),
        )
        .route("/patient/:uuid", get(patient::get_patient))
        .route("/visit", post(visit::create_visit))
        .route("/visit/:uuid", get(visit::get_visit))
        .route("/user", get(users::list_users).post(users::create_user))
        .route("/user/:id", get(users::get_user).delete(users::delete_user))
        .route("/role", get(users::list_roles).post(users::create_role))
        .route("/role/:uuid", get(users::get_role))
}

pub(crate) async fn not_found() -> impl IntoResponse {
    ApiError::not_found("Unknown resource")
}
