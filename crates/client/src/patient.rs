use crate::payload::PatientPayload;
use crate::resources::Results;
use crate::{ClientResult, OpenMrsClient};
use serde_json::Value;

impl OpenMrsClient {
    /// `POST /patient`, returning the created document.
    pub async fn create_patient(&self, payload: &PatientPayload) -> ClientResult<Value> {
        let created: Value = self.post_json("patient", payload).await?;
        tracing::info!(
            "created patient {}",
            created["uuid"].as_str().unwrap_or("<no uuid>")
        );
        Ok(created)
    }

    /// First patient matching `identifier`, if any.
    pub async fn find_patient_by_identifier(&self, identifier: &str) -> ClientResult<Option<Value>> {
        let page: Results<Value> = self
            .get_json("patient", &[("q", identifier), ("v", "default")])
            .await?;
        Ok(page.results.into_iter().next())
    }
}
