//! Users, roles and the current session.

use crate::payload::{RolePayload, UserPayload};
use crate::resources::{Results, Role, User};
use crate::{ClientError, ClientResult, OpenMrsClient};
use omrs_types::RetireReason;
use reqwest::StatusCode;
use serde_json::Value;

/// Result of [`OpenMrsClient::create_user`].
#[derive(Debug, Clone)]
pub enum CreateUserOutcome {
    Created(User),
    /// The server answered 409: a user with this username exists.
    AlreadyExists,
}

/// Label for the session location: `sessionLocation`, else `location`, by display, name or uuid.
pub fn session_location_label(session: &Value) -> String {
    let location = session
        .get("sessionLocation")
        .filter(|v| !v.is_null())
        .or_else(|| session.get("location").filter(|v| !v.is_null()));
    match location {
        Some(Value::Object(map)) => ["display", "name", "uuid"]
            .iter()
            .filter_map(|key| map.get(*key).and_then(Value::as_str))
            .find(|s| !s.is_empty())
            .unwrap_or("-")
            .to_owned(),
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(other) if !other.is_null() => other.to_string(),
        _ => "-".to_owned(),
    }
}

impl OpenMrsClient {
    /// `GET /user?v=full`, active users unless `retired`.
    pub async fn list_users(&self, retired: bool, limit: u32) -> ClientResult<Vec<User>> {
        let limit = limit.to_string();
        let retired = if retired { "true" } else { "false" };
        let page: Results<User> = self
            .get_json(
                "user",
                &[("retired", retired), ("v", "full"), ("limit", limit.as_str())],
            )
            .await?;
        Ok(page.results)
    }

    /// `GET /user/{uuid-or-username}?v=full` as raw JSON.
    pub async fn get_user(&self, id: &str) -> ClientResult<Value> {
        self.get_json(&format!("user/{id}"), &[("v", "full")]).await
    }

    /// Uuid of the first user matching `query`.
    pub async fn find_user_uuid(&self, query: &str) -> ClientResult<Option<String>> {
        let page: Results<User> = self.get_json("user", &[("q", query)]).await?;
        Ok(page.results.into_iter().next().map(|u| u.uuid))
    }

    pub async fn create_user(&self, payload: &UserPayload) -> ClientResult<CreateUserOutcome> {
        let response = self.post_raw("user", payload).await?;
        if response.status == StatusCode::CONFLICT {
            tracing::warn!("user {} already exists", payload.username);
            return Ok(CreateUserOutcome::AlreadyExists);
        }
        let user: User = response.into_result("user")?.decode()?;
        tracing::info!("created user {} ({})", payload.username, user.uuid);
        Ok(CreateUserOutcome::Created(user))
    }

    /// Purge the user.
    pub async fn delete_user(&self, uuid: &str) -> ClientResult<()> {
        self.delete(&format!("user/{uuid}"), &[("purge", "true")])
            .await?;
        tracing::info!("deleted user {uuid}");
        Ok(())
    }

    pub async fn retire_user(&self, uuid: &str, reason: &RetireReason) -> ClientResult<()> {
        self.delete(&format!("user/{uuid}"), &[("reason", reason.as_str())])
            .await?;
        tracing::info!("retired user {uuid}");
        Ok(())
    }

    /// Location of the current session, as labelled by [`session_location_label`].
    pub async fn session_location(&self) -> ClientResult<String> {
        let session: Value = self.get_json("appui/session", &[("v", "full")]).await?;
        Ok(session_location_label(&session))
    }

    pub async fn list_roles(&self, limit: u32) -> ClientResult<Vec<Role>> {
        let limit = limit.to_string();
        let page: Results<Role> = self
            .get_json("role", &[("v", "default"), ("limit", limit.as_str())])
            .await?;
        Ok(page.results)
    }

    pub async fn get_role(&self, uuid: &str) -> ClientResult<Role> {
        self.get_json(&format!("role/{uuid}"), &[("v", "full")])
            .await
    }

    pub async fn create_role(&self, payload: &RolePayload) -> ClientResult<Role> {
        let role: Role = self.post_json("role", payload).await?;
        tracing::info!("created role {} ({})", payload.name, role.uuid);
        Ok(role)
    }

    /// Resolve `username` to a uuid, failing if nobody matches.
    pub async fn require_user_uuid(&self, username: &str) -> ClientResult<String> {
        self.find_user_uuid(username)
            .await?
            .ok_or_else(|| ClientError::Missing(format!("user '{username}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_session_location_label_fallbacks() {
        assert_eq!(
            session_location_label(&json!({"sessionLocation": {"display": "Ward", "uuid": "u"}})),
            "Ward"
        );
        assert_eq!(
            session_location_label(&json!({"sessionLocation": null, "location": {"uuid": "u"}})),
            "u"
        );
        assert_eq!(session_location_label(&json!({"location": "Lab"})), "Lab");
        assert_eq!(session_location_label(&json!({})), "-");
        assert_eq!(session_location_label(&json!({"sessionLocation": {}})), "-");
    }
}
