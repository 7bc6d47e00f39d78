//! Locations, identifier types and visit types.

use crate::constants::OPENMRS_ID_TYPE_NAME;
use crate::resources::{IdentifierType, Location, Results, VisitType};
use crate::{ClientError, ClientResult, OpenMrsClient};
use omrs_identifiers::{full_match, generate_from_regex_format, generate_identifier};
use omrs_types::RetireReason;
use rand::seq::SliceRandom;

impl OpenMrsClient {
    pub async fn list_locations(&self) -> ClientResult<Vec<Location>> {
        let page: Results<Location> = self.get_json("location", &[]).await?;
        Ok(page.results)
    }

    /// Any non-retired location.
    pub async fn random_location(&self) -> ClientResult<Location> {
        let locations = self.list_locations().await?;
        locations
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or(ClientError::Empty("locations"))
    }

    /// `DELETE /location/{uuid}?reason=...` marks the location retired.
    pub async fn retire_location(&self, uuid: &str, reason: &RetireReason) -> ClientResult<()> {
        self.delete(&format!("location/{uuid}"), &[("reason", reason.as_str())])
            .await?;
        tracing::info!("retired location {uuid}");
        Ok(())
    }

    pub async fn list_identifier_types(&self) -> ClientResult<Vec<IdentifierType>> {
        let page: Results<IdentifierType> = self
            .get_json("patientidentifiertype", &[("v", "default")])
            .await?;
        Ok(page.results)
    }

    /// Uuid of the identifier type that is both required and named `name`.
    pub async fn required_identifier_type_uuid(&self, name: &str) -> ClientResult<String> {
        self.list_identifier_types()
            .await?
            .into_iter()
            .find(|t| t.required && t.name.as_deref() == Some(name))
            .map(|t| t.uuid)
            .ok_or_else(|| ClientError::Missing(format!("required identifier type '{name}'")))
    }

    /// The required "OpenMRS ID" type and a fresh value with a valid check character.
    pub async fn openmrs_id_identifier(&self) -> ClientResult<(String, String)> {
        let type_uuid = self
            .required_identifier_type_uuid(OPENMRS_ID_TYPE_NAME)
            .await?;
        let value = generate_identifier(omrs_identifiers::DEFAULT_PAYLOAD_LENGTH)?;
        Ok((type_uuid, value.to_string()))
    }

    /// The first identifier type with a supported format, and a value matching it.
    ///
    /// Types without a format, or with a format the generator cannot satisfy, are skipped.
    pub async fn identifier_type_with_generated_value(
        &self,
    ) -> ClientResult<Option<(String, String)>> {
        for identifier_type in self.list_identifier_types().await? {
            let Some(format) = identifier_type.format() else {
                continue;
            };
            let value = match generate_from_regex_format(format) {
                Ok(value) => value,
                Err(e) => {
                    tracing::debug!("skipping identifier type {}: {e}", identifier_type.uuid);
                    continue;
                }
            };
            if full_match(format, &value)? {
                return Ok(Some((identifier_type.uuid, value)));
            }
        }
        Ok(None)
    }

    pub async fn list_visit_types(&self) -> ClientResult<Vec<VisitType>> {
        let page: Results<VisitType> = self.get_json("visittype", &[]).await?;
        Ok(page.results)
    }

    pub async fn random_visit_type(&self) -> ClientResult<VisitType> {
        let types = self.list_visit_types().await?;
        types
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or(ClientError::Empty("visit types"))
    }
}
