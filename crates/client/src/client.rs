//! HTTP plumbing shared by every resource operation.

use crate::config::{ClientConfig, Credentials};
use crate::{ClientError, ClientResult};
use reqwest::{header::ACCEPT, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// A response whose status has not been interpreted.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    pub fn json(&self) -> ClientResult<Value> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// The error body flattened to lowercase text for keyword assertions.
    ///
    /// The leaf values of a JSON body are joined with spaces, depth first. Object members come in
    /// key order (`serde_json` keeps maps sorted), so only use the text for substring checks.
    /// A non-JSON body is used as is.
    pub fn error_text(&self) -> String {
        match serde_json::from_str::<Value>(&self.body) {
            Ok(value @ (Value::Object(_) | Value::Array(_))) => {
                let mut leaves = Vec::new();
                collect_leaves(&value, &mut leaves);
                leaves.join(" ").to_lowercase()
            }
            _ => self.body.to_lowercase(),
        }
    }

    /// Converts a non-2xx response into the matching [`ClientError`].
    pub fn into_result(self, path: &str) -> ClientResult<Self> {
        match self.status {
            status if status.is_success() => Ok(self),
            StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized { body: self.body }),
            StatusCode::FORBIDDEN => Err(ClientError::Forbidden { body: self.body }),
            StatusCode::NOT_FOUND => Err(ClientError::NotFound { path: path.to_owned() }),
            status => Err(ClientError::Status {
                status: status.as_u16(),
                body: self.body,
            }),
        }
    }

    pub fn decode<T: DeserializeOwned>(&self) -> ClientResult<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

fn collect_leaves(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Null => {}
        Value::String(s) => out.push(s.clone()),
        Value::Object(map) => map.values().for_each(|v| collect_leaves(v, out)),
        Value::Array(items) => items.iter().for_each(|v| collect_leaves(v, out)),
        other => out.push(other.to_string()),
    }
}

/// Client for the OpenMRS REST v1 API.
///
/// Cheap to clone: clones share one connection pool.
#[derive(Clone, Debug)]
pub struct OpenMrsClient {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
}

impl OpenMrsClient {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.timeout())
            .timeout(config.timeout())
            .build()?;
        tracing::debug!("OpenMRS client for {}", config.base_url());
        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }

    /// A client sharing this one's connection pool but authenticating as someone else.
    pub fn with_credentials(&self, credentials: Credentials) -> Self {
        Self {
            http: self.http.clone(),
            config: Arc::new(self.config.with_credentials(credentials)),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url(), path.trim_start_matches('/'))
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> ClientResult<ApiResponse> {
        let credentials = self.config.credentials();
        let mut request = self
            .http
            .request(method.clone(), self.url(path))
            .basic_auth(&credentials.username, Some(&credentials.password))
            .header(ACCEPT, "application/json")
            .query(query);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        tracing::debug!("{method} {path} -> {}", status.as_u16());
        Ok(ApiResponse { status, body })
    }

    pub async fn get_raw(&self, path: &str, query: &[(&str, &str)]) -> ClientResult<ApiResponse> {
        self.send::<Value>(Method::GET, path, query, None).await
    }

    pub async fn post_raw<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<ApiResponse> {
        self.send(Method::POST, path, &[], Some(body)).await
    }

    pub async fn delete_raw(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> ClientResult<ApiResponse> {
        self.send::<Value>(Method::DELETE, path, query, None).await
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> ClientResult<T> {
        self.get_raw(path, query).await?.into_result(path)?.decode()
    }

    pub(crate) async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.post_raw(path, body).await?.into_result(path)?.decode()
    }

    pub(crate) async fn delete(&self, path: &str, query: &[(&str, &str)]) -> ClientResult<()> {
        self.delete_raw(path, query).await?.into_result(path)?;
        Ok(())
    }
}
