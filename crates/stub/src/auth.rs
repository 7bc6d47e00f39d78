//! HTTP basic authentication and privilege checks.

use crate::error::{ApiError, ApiResult};
use crate::state::{Store, UserRecord};
use axum::http::{header::AUTHORIZATION, HeaderMap};
use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Decode `Authorization: Basic ...` into `(username, password)`.
fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_owned(), password.to_owned()))
}

/// The active user the request authenticates as, or 401.
pub(crate) fn authenticate<'a>(store: &'a Store, headers: &HeaderMap) -> ApiResult<&'a UserRecord> {
    let (username, password) = basic_credentials(headers).ok_or_else(ApiError::unauthorized)?;
    match store.user_by_username(&username) {
        Some(user) if !user.retired && user.password == password => Ok(user),
        _ => {
            tracing::debug!("authentication failed for {username:?}");
            Err(ApiError::unauthorized())
        }
    }
}

/// 403 unless one of `user`'s roles grants `privilege`.
pub(crate) fn require_privilege(store: &Store, user: &UserRecord, privilege: &str) -> ApiResult<()> {
    if store.user_privileges(user).contains(&privilege) {
        Ok(())
    } else {
        Err(ApiError::forbidden(privilege))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::{seeded_store, ADD_PATIENTS};
    use axum::http::{HeaderValue, StatusCode};

    fn headers(user: &str, pass: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let token = STANDARD.encode(format!("{user}:{pass}"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Basic {token}")).unwrap(),
        );
        headers
    }

    #[test]
    fn test_valid_credentials_authenticate() {
        let store = seeded_store();
        let user = authenticate(&store, &headers("admin", "Admin123")).unwrap();
        assert_eq!(user.username, "admin");
    }

    #[test]
    fn test_wrong_password_is_unauthorized() {
        let store = seeded_store();
        let err = authenticate(&store, &headers("admin", "WRONG_PASSWORD")).unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_missing_header_is_unauthorized() {
        let store = seeded_store();
        let err = authenticate(&store, &HeaderMap::new()).unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_password_may_contain_colon() {
        let mut store = seeded_store();
        for user in store.users.values_mut() {
            if user.username == "clerk" {
                user.password = "a:b".into();
            }
        }
        assert!(authenticate(&store, &headers("clerk", "a:b")).is_ok());
    }

    #[test]
    fn test_clerk_lacks_add_patients() {
        let store = seeded_store();
        let clerk = store.user_by_username("clerk").unwrap();
        let err = require_privilege(&store, clerk, ADD_PATIENTS).unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }
}
