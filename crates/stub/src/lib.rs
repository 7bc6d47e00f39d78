//! # OMRS stub
//!
//! In-memory stand-in for the slice of the OpenMRS REST v1 namespace that the client, CLI and
//! scenario suite talk to.
//!
//! Handles:
//! - HTTP endpoints with axum, nested under [`BASE_PATH`]
//! - HTTP basic authentication against seeded users and role privileges
//! - Request validation mirroring what the real server rejects (identifier check characters,
//!   unknown references, overlapping visits)
//!
//! Nothing is persisted; every [`StubState::seeded`] starts from the same fixtures.

#![warn(rust_2018_idioms)]

mod auth;
mod error;
mod handlers;
mod repr;
mod seed;
mod state;
mod validate;

pub use error::ApiError;
pub use seed::{
    ADMIN_PASSWORD, ADMIN_USERNAME, CLERK_PASSWORD, CLERK_USERNAME, INPATIENT_WARD_UUID,
    OLD_ID_TYPE_UUID, OPENMRS_ID_TYPE_UUID, OUTPATIENT_CLINIC_UUID,
};
pub use state::StubState;

use axum::Router;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;

/// Path prefix the REST resources are mounted under.
pub const BASE_PATH: &str = "/openmrs/ws/rest/v1";

/// Build the stub router around `state`.
pub fn router(state: StubState) -> Router {
    Router::new()
        .nest(BASE_PATH, handlers::routes())
        .fallback(handlers::not_found)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind `addr`, serve a freshly seeded stub in the background and return the bound address.
///
/// Binding `127.0.0.1:0` picks a free port, which is how the test suites use it.
pub async fn spawn(addr: &str) -> std::io::Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    let app = router(StubState::seeded());
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("stub server stopped: {e}");
        }
    });
    tracing::debug!("stub listening on {local}");
    Ok(local)
}

/// Base URL of a stub bound at `addr`.
pub fn base_url(addr: SocketAddr) -> String {
    format!("http://{addr}{BASE_PATH}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use http_body_util::BodyExt;
    use omrs_identifiers::generate_identifier;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn auth(user: &str, pass: &str) -> String {
        format!("Basic {}", STANDARD.encode(format!("{user}:{pass}")))
    }

    async fn call(app: &Router, method: &str, path: &str, body: Option<Value>) -> (StatusCode, Value) {
        call_as(app, (ADMIN_USERNAME, ADMIN_PASSWORD), method, path, body).await
    }

    async fn call_as(
        app: &Router,
        (user, pass): (&str, &str),
        method: &str,
        path: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(format!("{BASE_PATH}{path}"))
            .header(header::AUTHORIZATION, auth(user, pass))
            .header(header::CONTENT_TYPE, "application/json")
            .body(match body {
                Some(b) => Body::from(b.to_string()),
                None => Body::empty(),
            })
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn patient_payload(identifier: &str) -> Value {
        json!({
            "person": {
                "names": [{ "givenName": "Ann", "familyName": "Lee" }],
                "gender": "F",
                "birthdate": "1990-01-01"
            },
            "identifiers": [{
                "identifier": identifier,
                "identifierType": OPENMRS_ID_TYPE_UUID,
                "location": OUTPATIENT_CLINIC_UUID,
                "preferred": true
            }]
        })
    }

    #[tokio::test]
    async fn test_lists_seeded_locations() {
        let app = router(StubState::seeded());
        let (status, body) = call(&app, "GET", "/location", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_wrong_password_is_401() {
        let app = router(StubState::seeded());
        let (status, _) = call_as(&app, ("admin", "nope"), "GET", "/location", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let app = router(StubState::seeded());
        let (status, _) = call(&app, "GET", "/encounterrole", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_patient_with_valid_identifier() {
        let app = router(StubState::seeded());
        let id = generate_identifier(7).unwrap();
        let (status, body) = call(&app, "POST", "/patient", Some(patient_payload(id.as_str()))).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        assert_eq!(
            body["identifiers"][0]["display"],
            format!("OpenMRS ID = {id}")
        );

        let (status, found) = call(&app, "GET", &format!("/patient?q={id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(found["results"][0]["uuid"], body["uuid"]);
    }

    #[tokio::test]
    async fn test_bad_check_character_is_400() {
        let app = router(StubState::seeded());
        let (status, body) = call(&app, "POST", "/patient", Some(patient_payload("1234567J"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["message"].as_str().unwrap().contains("identifier"));
    }

    #[tokio::test]
    async fn test_clerk_cannot_create_patient() {
        let app = router(StubState::seeded());
        let id = generate_identifier(7).unwrap();
        let (status, _) = call_as(
            &app,
            (CLERK_USERNAME, CLERK_PASSWORD),
            "POST",
            "/patient",
            Some(patient_payload(id.as_str())),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_duplicate_username_is_409() {
        let app = router(StubState::seeded());
        let payload = json!({
            "username": "admin",
            "password": "Password123",
            "person": { "names": [{ "givenName": "A", "familyName": "B" }], "gender": "M" }
        });
        let (status, _) = call(&app, "POST", "/user", Some(payload)).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_retired_location_is_hidden() {
        let app = router(StubState::seeded());
        let (status, _) = call(
            &app,
            "DELETE",
            &format!("/location/{INPATIENT_WARD_UUID}?reason=closed"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, body) = call(&app, "GET", "/location", None).await;
        assert_eq!(body["results"].as_array().unwrap().len(), 1);
    }
}
