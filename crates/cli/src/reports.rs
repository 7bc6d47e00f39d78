//! Row builders for the listing subcommands.

use omrs_client::resources::{Role, User};

const NONE: &str = "-";

fn joined(items: Vec<&str>) -> String {
    if items.is_empty() {
        NONE.to_owned()
    } else {
        items.join(", ")
    }
}

/// Which users a `users` report keeps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrivilegeFilter {
    Any,
    With(String),
    Without(String),
}

impl PrivilegeFilter {
    pub fn from_args(with: Option<String>, without: Option<String>) -> Self {
        match (with, without) {
            (Some(p), _) => Self::With(p),
            (None, Some(p)) => Self::Without(p),
            (None, None) => Self::Any,
        }
    }

    pub fn keeps(&self, user: &User) -> bool {
        match self {
            Self::Any => true,
            Self::With(p) => user.has_privilege(p),
            Self::Without(p) => !user.has_privilege(p),
        }
    }

    fn privilege(&self) -> Option<&str> {
        match self {
            Self::Any => None,
            Self::With(p) | Self::Without(p) => Some(p),
        }
    }
}

pub fn user_headers(filter: &PrivilegeFilter, all_privileges: bool) -> Vec<&'static str> {
    let mut headers = vec!["Username", "Person", "Roles"];
    if filter.privilege().is_some() {
        headers.push("Granted by");
    }
    headers.push(if all_privileges {
        "Privileges"
    } else {
        "Privilege count"
    });
    headers.push("UUID");
    headers
}

pub fn user_rows(users: &[User], filter: &PrivilegeFilter, all_privileges: bool) -> Vec<Vec<String>> {
    users
        .iter()
        .filter(|u| filter.keeps(u))
        .map(|user| {
            let mut row = vec![
                user.username().to_owned(),
                user.person_display().to_owned(),
                joined(user.role_names()),
            ];
            if let Some(privilege) = filter.privilege() {
                row.push(joined(user.roles_granting(privilege)));
            }
            let privileges = user.privileges();
            row.push(if all_privileges {
                joined(privileges.into_iter().collect())
            } else {
                privileges.len().to_string()
            });
            row.push(user.uuid.clone());
            row
        })
        .collect()
}

pub fn role_rows(roles: &[Role], privilege: Option<&str>) -> Vec<Vec<String>> {
    roles
        .iter()
        .map(|role| {
            let mut row = vec![
                role.label().to_owned(),
                role.description.clone().unwrap_or_else(|| NONE.to_owned()),
            ];
            if let Some(privilege) = privilege {
                row.push(if role.grants(privilege) { "yes" } else { "no" }.to_owned());
            }
            row.push(role.uuid.clone());
            row
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn users() -> Vec<User> {
        serde_json::from_value(json!([
            {
                "uuid": "u-admin",
                "username": "admin",
                "person": {"uuid": "p1", "display": "Super User"},
                "roles": [{
                    "uuid": "r1",
                    "display": "System Developer",
                    "privileges": [{"display": "Add Patients"}, {"display": "Add Visits"}]
                }]
            },
            {
                "uuid": "u-clerk",
                "username": "clerk",
                "roles": [{
                    "uuid": "r2",
                    "display": "Clerk",
                    "privileges": [{"display": "Get Patients"}]
                }]
            }
        ]))
        .unwrap()
    }

    #[test]
    fn test_filter_from_args_prefers_with() {
        assert_eq!(PrivilegeFilter::from_args(None, None), PrivilegeFilter::Any);
        assert_eq!(
            PrivilegeFilter::from_args(None, Some("x".into())),
            PrivilegeFilter::Without("x".into())
        );
    }

    #[test]
    fn test_with_privilege_rows() {
        let filter = PrivilegeFilter::With("Add Patients".into());
        let rows = user_rows(&users(), &filter, false);
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0],
            vec!["admin", "Super User", "System Developer", "System Developer", "2", "u-admin"]
        );
        assert_eq!(user_headers(&filter, false).len(), rows[0].len());
    }

    #[test]
    fn test_without_privilege_lists_privileges() {
        let filter = PrivilegeFilter::Without("Add Patients".into());
        let rows = user_rows(&users(), &filter, true);
        assert_eq!(rows, vec![vec!["clerk", "-", "Clerk", "-", "Get Patients", "u-clerk"]]);
    }

    #[test]
    fn test_role_rows_mark_grants() {
        let rows = role_rows(&users()[0].roles, Some("Add Visits"));
        assert_eq!(rows[0], vec!["System Developer", "-", "yes", "r1"]);
        assert_eq!(role_rows(&users()[1].roles, None)[0], vec!["Clerk", "-", "r2"]);
    }
}
