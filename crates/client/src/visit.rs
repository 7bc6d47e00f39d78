use crate::payload::VisitPayload;
use crate::{ClientResult, OpenMrsClient};
use serde_json::Value;

impl OpenMrsClient {
    /// `POST /visit`, returning the created document.
    pub async fn create_visit(&self, payload: &VisitPayload) -> ClientResult<Value> {
        let created: Value = self.post_json("visit", payload).await?;
        tracing::info!(
            "created visit {} for patient {}",
            created["uuid"].as_str().unwrap_or("<no uuid>"),
            payload.patient
        );
        Ok(created)
    }

    /// `GET /visit/{uuid}?v=full`.
    pub async fn fetch_visit_full(&self, uuid: &str) -> ClientResult<Value> {
        self.get_json(&format!("visit/{uuid}"), &[("v", "full")])
            .await
    }
}
