//! References between REST resources.
//!
//! Depending on the `v=` representation requested (and sometimes on nothing at all), the API
//! returns a referenced resource either as its bare UUID string or as an object carrying at
//! least a `uuid`. Both shapes are kept distinct rather than normalised away.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A reference to another resource: `"<uuid>"` or `{"uuid": "<uuid>", ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reference {
    /// Bare UUID string.
    Uuid(String),
    /// Embedded resource object. Extra fields besides `display` are ignored.
    Resource {
        uuid: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        display: Option<String>,
    },
}

impl Reference {
    /// Reads a reference out of an arbitrary JSON value.
    ///
    /// Returns `None` for anything that is neither a string nor an object with a string `uuid`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(uuid) => Some(Reference::Uuid(uuid.clone())),
            Value::Object(map) => {
                let uuid = map.get("uuid")?.as_str()?.to_owned();
                let display = map
                    .get("display")
                    .and_then(Value::as_str)
                    .map(str::to_owned);
                Some(Reference::Resource { uuid, display })
            }
            _ => None,
        }
    }

    /// The referenced UUID, whichever shape carried it.
    pub fn uuid(&self) -> &str {
        match self {
            Reference::Uuid(uuid) => uuid,
            Reference::Resource { uuid, .. } => uuid,
        }
    }

    /// The `display` of an embedded resource, if any.
    pub fn display(&self) -> Option<&str> {
        match self {
            Reference::Uuid(_) => None,
            Reference::Resource { display, .. } => display.as_deref(),
        }
    }

    pub fn refers_to(&self, uuid: &str) -> bool {
        self.uuid() == uuid
    }
}
