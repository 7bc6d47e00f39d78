//! Client configuration.
//!
//! Resolved once at process startup and passed into [`crate::OpenMrsClient`]. Nothing in the
//! client reads environment variables while requests are in flight.

use crate::constants::{
    BASE_URL_ENV, DEFAULT_BASE_URL, DEFAULT_PASSWORD, DEFAULT_TIMEOUT_SECS, DEFAULT_USERNAME,
    LIMITED_PASSWORD_ENV, LIMITED_USERNAME_ENV, PASSWORD_ENV, TIMEOUT_ENV, USERNAME_ENV,
};
use crate::{ClientError, ClientResult};
use reqwest::Url;
use std::time::Duration;

/// A username and password for HTTP basic auth.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ClientConfig {
    base_url: String,
    credentials: Credentials,
    timeout: Duration,
}

impl ClientConfig {
    /// Create a new `ClientConfig`.
    ///
    /// The base URL must be http or https; a trailing slash is dropped. Credentials must be
    /// non-empty.
    pub fn new(
        base_url: &str,
        credentials: Credentials,
        timeout: Duration,
    ) -> ClientResult<Self> {
        let cleaned = base_url.trim().trim_end_matches('/');
        let parsed = Url::parse(cleaned)
            .map_err(|e| ClientError::Config(format!("invalid base URL '{cleaned}': {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::Config(format!(
                "base URL must use http or https, got {}",
                parsed.scheme()
            )));
        }
        if credentials.username.trim().is_empty() || credentials.password.is_empty() {
            return Err(ClientError::Config("credentials cannot be empty".into()));
        }
        if timeout.is_zero() {
            return Err(ClientError::Config("timeout must be positive".into()));
        }

        Ok(Self {
            base_url: cleaned.to_owned(),
            credentials,
            timeout,
        })
    }

    /// Build a configuration from the process environment.
    pub fn from_env() -> ClientResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from `lookup`, falling back to the defaults for unset keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ClientResult<Self> {
        let base_url = lookup(BASE_URL_ENV).unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let username = lookup(USERNAME_ENV).unwrap_or_else(|| DEFAULT_USERNAME.into());
        let password = lookup(PASSWORD_ENV).unwrap_or_else(|| DEFAULT_PASSWORD.into());
        let timeout_secs = match lookup(TIMEOUT_ENV) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                ClientError::Config(format!("{TIMEOUT_ENV} must be a whole number of seconds"))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        Self::new(
            &base_url,
            Credentials::new(username, password),
            Duration::from_secs(timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The same configuration authenticating as someone else.
    pub fn with_credentials(&self, credentials: Credentials) -> Self {
        Self {
            credentials,
            ..self.clone()
        }
    }
}

/// Credentials of a user lacking the patient and visit creation privileges, if configured.
pub fn limited_credentials_from_env() -> Option<Credentials> {
    limited_credentials_from_lookup(|key| std::env::var(key).ok())
}

pub fn limited_credentials_from_lookup(
    lookup: impl Fn(&str) -> Option<String>,
) -> Option<Credentials> {
    let username = lookup(LIMITED_USERNAME_ENV).filter(|u| !u.trim().is_empty())?;
    let password = lookup(LIMITED_PASSWORD_ENV).filter(|p| !p.is_empty())?;
    Some(Credentials::new(username, password))
}
