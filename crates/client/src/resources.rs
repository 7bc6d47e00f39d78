//! Read models for list and detail responses.
//!
//! Only the fields the tooling needs are modelled; everything else in a response is ignored.
//! Labels fall back `display → name → "-"`, the same way the server's own UI does.

use omrs_types::Reference;
use serde::Deserialize;
use std::collections::BTreeSet;

const NO_LABEL: &str = "-";

fn label<'a>(display: &'a Option<String>, name: &'a Option<String>) -> &'a str {
    display
        .as_deref()
        .filter(|s| !s.is_empty())
        .or_else(|| name.as_deref().filter(|s| !s.is_empty()))
        .unwrap_or(NO_LABEL)
}

/// `{"results": [...]}` wrapper of list endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Results<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Location {
    pub uuid: String,
    #[serde(default)]
    pub display: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub retired: bool,
}

impl Location {
    pub fn label(&self) -> &str {
        label(&self.display, &self.name)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdentifierType {
    pub uuid: String,
    #[serde(default)]
    pub display: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub format: Option<String>,
}

impl IdentifierType {
    pub fn label(&self) -> &str {
        label(&self.display, &self.name)
    }

    /// The format regex, if one is configured and non-empty.
    pub fn format(&self) -> Option<&str> {
        self.format.as_deref().filter(|f| !f.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VisitType {
    pub uuid: String,
    #[serde(default)]
    pub display: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl VisitType {
    pub fn label(&self) -> &str {
        label(&self.display, &self.name)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Privilege {
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub display: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl Privilege {
    /// Display or name; empty if the server sent neither.
    pub fn name(&self) -> &str {
        self.display
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.name.as_deref())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Role {
    pub uuid: String,
    #[serde(default)]
    pub display: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub privileges: Vec<Privilege>,
}

impl Role {
    pub fn label(&self) -> &str {
        label(&self.display, &self.name)
    }

    pub fn privilege_names(&self) -> BTreeSet<&str> {
        self.privileges
            .iter()
            .map(Privilege::name)
            .filter(|n| !n.is_empty())
            .collect()
    }

    pub fn grants(&self, privilege: &str) -> bool {
        self.privilege_names().contains(privilege)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub uuid: String,
    #[serde(default)]
    pub display: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub person: Option<Reference>,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub retired: bool,
}

impl User {
    pub fn username(&self) -> &str {
        label(&self.username, &self.display)
    }

    pub fn person_display(&self) -> &str {
        self.person
            .as_ref()
            .and_then(Reference::display)
            .unwrap_or(NO_LABEL)
    }

    /// Union of the privileges granted by all roles.
    pub fn privileges(&self) -> BTreeSet<&str> {
        self.roles.iter().flat_map(Role::privilege_names).collect()
    }

    pub fn has_privilege(&self, privilege: &str) -> bool {
        self.privileges().contains(privilege)
    }

    /// Labels of the roles that grant `privilege`.
    pub fn roles_granting(&self, privilege: &str) -> Vec<&str> {
        self.roles
            .iter()
            .filter(|r| r.grants(privilege))
            .map(Role::label)
            .collect()
    }

    pub fn role_names(&self) -> Vec<&str> {
        self.roles.iter().map(Role::label).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user() -> User {
        serde_json::from_value(json!({
            "uuid": "u1",
            "username": "doctor",
            "person": { "uuid": "p1", "display": "Jane Doe" },
            "roles": [
                {
                    "uuid": "r1",
                    "display": "Doctor",
                    "privileges": [{ "display": "Add Patients" }, { "name": "Get Visits" }]
                },
                {
                    "uuid": "r2",
                    "name": "Clerk",
                    "privileges": [{ "display": "Get Visits" }]
                },
                { "uuid": "r3" }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_privileges_are_unioned() {
        let user = user();
        let privileges: Vec<&str> = user.privileges().into_iter().collect();
        assert_eq!(privileges, vec!["Add Patients", "Get Visits"]);
        assert!(user.has_privilege("Add Patients"));
        assert!(!user.has_privilege("Add Visits"));
    }

    #[test]
    fn test_roles_granting_and_labels() {
        let user = user();
        assert_eq!(user.roles_granting("Get Visits"), vec!["Doctor", "Clerk"]);
        assert_eq!(user.roles_granting("Add Patients"), vec!["Doctor"]);
        assert_eq!(user.role_names(), vec!["Doctor", "Clerk", "-"]);
        assert_eq!(user.person_display(), "Jane Doe");
        assert_eq!(user.username(), "doctor");
    }

    #[test]
    fn test_results_tolerates_missing_list() {
        let empty: Results<Location> = serde_json::from_value(json!({})).unwrap();
        assert!(empty.results.is_empty());
    }

    #[test]
    fn test_identifier_type_empty_format_is_none() {
        let t: IdentifierType =
            serde_json::from_value(json!({"uuid": "t", "name": "X", "format": ""})).unwrap();
        assert_eq!(t.format(), None);
        assert_eq!(t.label(), "X");
    }
}
