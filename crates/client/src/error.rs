#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("authentication rejected (401): {body}")]
    Unauthorized { body: String },
    #[error("access denied (403): {body}")]
    Forbidden { body: String },
    #[error("resource not found: {path}")]
    NotFound { path: String },
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("identifier error: {0}")]
    Identifier(#[from] omrs_identifiers::IdentifierError),
    #[error("{0} not found")]
    Missing(String),
    #[error("no {0} available")]
    Empty(&'static str),
    #[error("unexpected {resource} response: {detail}")]
    UnexpectedResponse {
        resource: &'static str,
        detail: String,
    },
    #[error("server returned a person without parseable names (uuid={uuid:?}, keys={keys:?})")]
    UnparseablePerson {
        uuid: Option<String>,
        keys: Vec<String>,
    },
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;
