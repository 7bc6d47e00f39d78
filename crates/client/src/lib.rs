//! # OMRS client
//!
//! Async client for the OpenMRS REST v1 API, built on `reqwest`.
//!
//! - [`ClientConfig`] resolves the base URL, credentials and timeout once at startup.
//! - [`OpenMrsClient`] offers raw access ([`OpenMrsClient::get_raw`] and friends return an
//!   [`ApiResponse`] without judging its status) for negative tests, and typed operations per
//!   resource that fail with [`ClientError`] on non-2xx responses.
//! - [`payload`] holds the request bodies, [`resources`] the read models.

#![warn(rust_2018_idioms)]

mod client;
pub mod config;
pub mod constants;
mod error;
mod metadata;
mod patient;
pub mod payload;
mod person;
pub mod resources;
mod users;
mod visit;

pub use client::{ApiResponse, OpenMrsClient};
pub use config::{ClientConfig, Credentials};
pub use error::{ClientError, ClientResult};
pub use person::{random_birthdate, random_person};
pub use reqwest::StatusCode;
pub use users::{session_location_label, CreateUserOutcome};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{IdentifierPayload, PatientPayload, RolePayload, UserPayload, VisitPayload};
    use chrono::{Duration, Utc};
    use omrs_checks::{validate_patient_response, validate_visit_response};
    use omrs_types::RetireReason;
    use std::time::Duration as StdDuration;

    async fn stub_client() -> OpenMrsClient {
        let addr = omrs_stub::spawn("127.0.0.1:0").await.unwrap();
        let config = ClientConfig::new(
            &omrs_stub::base_url(addr),
            Credentials::new(omrs_stub::ADMIN_USERNAME, omrs_stub::ADMIN_PASSWORD),
            StdDuration::from_secs(5),
        )
        .unwrap();
        OpenMrsClient::new(config).unwrap()
    }

    async fn new_patient(client: &OpenMrsClient) -> (String, String) {
        let (_, person) = client.create_valid_person().await.unwrap();
        let location = client.random_location().await.unwrap();
        let (type_uuid, value) = client.openmrs_id_identifier().await.unwrap();
        let payload =
            PatientPayload::new(person, IdentifierPayload::new(value, type_uuid, &location.uuid));
        let patient = client.create_patient(&payload).await.unwrap();
        (patient["uuid"].as_str().unwrap().to_owned(), location.uuid)
    }

    #[tokio::test]
    async fn test_create_valid_person_reads_names_back() {
        let client = stub_client().await;
        let (uuid, person) = client.create_valid_person().await.unwrap();
        assert!(!uuid.is_empty());
        assert_eq!(person.names.len(), 1);
        assert_eq!(person.birthdate.as_deref().map(str::len), Some(10));
    }

    #[tokio::test]
    async fn test_patient_round_trip_passes_checks() {
        let client = stub_client().await;
        let (_, person) = client.create_valid_person().await.unwrap();
        let location = client.random_location().await.unwrap();
        let (type_uuid, value) = client.openmrs_id_identifier().await.unwrap();
        let payload =
            PatientPayload::new(person, IdentifierPayload::new(&value, type_uuid, &location.uuid));

        let patient = client.create_patient(&payload).await.unwrap();
        validate_patient_response(&patient).unwrap();

        let found = client.find_patient_by_identifier(&value).await.unwrap().unwrap();
        assert_eq!(found["uuid"], patient["uuid"]);
        assert!(client
            .find_patient_by_identifier("NO-SUCH-ID")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_identifier_type_with_generated_value_uses_format() {
        let client = stub_client().await;
        let (type_uuid, value) = client
            .identifier_type_with_generated_value()
            .await
            .unwrap()
            .unwrap();
        assert_eq!(type_uuid, omrs_stub::OLD_ID_TYPE_UUID);
        assert_eq!(value.len(), 9);
    }

    #[tokio::test]
    async fn test_visit_created_and_refetched() {
        let client = stub_client().await;
        let (patient_uuid, location_uuid) = new_patient(&client).await;
        let visit_type = client.random_visit_type().await.unwrap();

        let payload = VisitPayload::new(&patient_uuid, &visit_type.uuid, Utc::now())
            .at_location(&location_uuid);
        let visit = client.create_visit(&payload).await.unwrap();
        validate_visit_response(&visit, &patient_uuid, &visit_type.uuid, &location_uuid).unwrap();

        let full = client
            .fetch_visit_full(visit["uuid"].as_str().unwrap())
            .await
            .unwrap();
        validate_visit_response(&full, &patient_uuid, &visit_type.uuid, &location_uuid).unwrap();
    }

    #[tokio::test]
    async fn test_overlapping_visit_is_rejected() {
        let client = stub_client().await;
        let (patient_uuid, location_uuid) = new_patient(&client).await;
        let visit_type = client.random_visit_type().await.unwrap();

        let first = VisitPayload::new(&patient_uuid, &visit_type.uuid, Utc::now() - Duration::minutes(30))
            .at_location(&location_uuid);
        client.create_visit(&first).await.unwrap();

        let second = VisitPayload::new(&patient_uuid, &visit_type.uuid, Utc::now() - Duration::minutes(10))
            .at_location(&location_uuid);
        let response = client.post_raw("visit", &second).await.unwrap();
        assert_eq!(response.status_code(), 400);
        assert!(response.error_text().contains("overlap"));
    }

    #[tokio::test]
    async fn test_wrong_password_is_unauthorized() {
        let client = stub_client().await;
        let intruder = client.with_credentials(Credentials::new("admin", "WRONG_PASSWORD"));
        assert!(matches!(
            intruder.list_locations().await,
            Err(ClientError::Unauthorized { .. })
        ));
    }

    #[tokio::test]
    async fn test_users_roles_and_session() {
        let client = stub_client().await;

        let role = client
            .create_role(&RolePayload {
                name: "Custom: Add Patients Only".into(),
                description: Some("Can add patients".into()),
                privileges: vec![crate::payload::PrivilegeRef {
                    name: constants::ADD_PATIENTS_PRIVILEGE.into(),
                }],
            })
            .await
            .unwrap();
        assert!(role.grants(constants::ADD_PATIENTS_PRIVILEGE));
        assert!(client
            .list_roles(100)
            .await
            .unwrap()
            .iter()
            .any(|r| r.uuid == role.uuid));

        let outcome = client
            .create_user(&UserPayload::demo(200, &role.uuid))
            .await
            .unwrap();
        let CreateUserOutcome::Created(user) = outcome else {
            panic!("expected a new user");
        };
        assert!(user.has_privilege(constants::ADD_PATIENTS_PRIVILEGE));
        assert!(matches!(
            client.create_user(&UserPayload::demo(200, &role.uuid)).await.unwrap(),
            CreateUserOutcome::AlreadyExists
        ));

        let active = client.list_users(false, 100).await.unwrap();
        assert!(active.iter().any(|u| u.username() == "user200"));

        let uuid = client.require_user_uuid("user200").await.unwrap();
        client
            .retire_user(&uuid, &RetireReason::new("No longer active").unwrap())
            .await
            .unwrap();
        let retired = client.list_users(true, 100).await.unwrap();
        assert!(retired.iter().any(|u| u.uuid == uuid));

        client.delete_user(&uuid).await.unwrap();
        assert!(matches!(
            client.get_user(&uuid).await,
            Err(ClientError::NotFound { .. })
        ));

        assert_eq!(client.session_location().await.unwrap(), "Outpatient Clinic");
    }

    #[tokio::test]
    async fn test_retire_location() {
        let client = stub_client().await;
        let before = client.list_locations().await.unwrap().len();
        client
            .retire_location(
                omrs_stub::INPATIENT_WARD_UUID,
                &RetireReason::new("Location is no longer in use").unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(client.list_locations().await.unwrap().len(), before - 1);
    }
}
