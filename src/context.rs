//! Shared fixtures: clients and the patients, payloads and metadata scenarios build on.

use anyhow::Context as _;
use chrono::Utc;
use omrs_client::payload::{IdentifierPayload, PatientPayload, Person};
use omrs_client::{ApiResponse, ClientResult, Credentials, OpenMrsClient, random_person};
use serde_json::Value;

/// A freshly created patient and the location its identifier was assigned at.
#[derive(Debug, Clone)]
pub struct PatientContext {
    pub patient_uuid: String,
    pub location_uuid: String,
}

/// A valid patient document and the identifier value it carries.
#[derive(Debug, Clone)]
pub struct PatientDraft {
    pub payload: PatientPayload,
    pub identifier: String,
}

impl PatientDraft {
    /// The payload as JSON, for scenarios that corrupt single fields.
    pub fn to_value(&self) -> anyhow::Result<Value> {
        Ok(serde_json::to_value(&self.payload)?)
    }
}

pub struct Context {
    pub client: OpenMrsClient,
    /// Authenticates as a user lacking the Add Patients and Add Visits privileges.
    pub limited: Option<OpenMrsClient>,
}

impl Context {
    pub fn new(client: OpenMrsClient, limited: Option<Credentials>) -> Self {
        let limited = limited.map(|credentials| client.with_credentials(credentials));
        Self { client, limited }
    }

    /// The configured user with a wrong password.
    pub fn wrong_password(&self) -> OpenMrsClient {
        let username = self.client.config().credentials().username.clone();
        self.client
            .with_credentials(Credentials::new(username, "WRONG_PASSWORD"))
    }

    pub fn random_person() -> Person {
        random_person(&mut rand::thread_rng(), Utc::now().date_naive())
    }

    /// A valid patient payload for `person`: random location, generated "OpenMRS ID".
    pub async fn patient_draft(&self, person: Person) -> anyhow::Result<PatientDraft> {
        let location = self.client.random_location().await?;
        let (type_uuid, identifier) = self.client.openmrs_id_identifier().await?;
        let payload = PatientPayload::new(
            person,
            IdentifierPayload::new(identifier.clone(), type_uuid, location.uuid),
        );
        Ok(PatientDraft {
            payload,
            identifier,
        })
    }

    /// A draft whose person was created first and read back from the server.
    pub async fn existing_person_draft(&self) -> anyhow::Result<PatientDraft> {
        let (_, person) = self
            .client
            .create_valid_person()
            .await
            .context("creating person")?;
        self.patient_draft(person).await
    }

    pub async fn new_patient(&self) -> anyhow::Result<PatientContext> {
        let draft = self.existing_person_draft().await?;
        let location_uuid = draft.payload.identifiers[0].location.clone();
        let created = self
            .client
            .create_patient(&draft.payload)
            .await
            .context("creating patient")?;
        let patient_uuid = created["uuid"]
            .as_str()
            .context("created patient has no uuid")?
            .to_owned();
        Ok(PatientContext {
            patient_uuid,
            location_uuid,
        })
    }

    pub async fn visit_type_uuid(&self) -> anyhow::Result<String> {
        Ok(self.client.random_visit_type().await?.uuid)
    }

    pub async fn post(&self, path: &str, body: &Value) -> ClientResult<ApiResponse> {
        self.client.post_raw(path, body).await
    }
}
