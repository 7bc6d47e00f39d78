use std::fmt;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ReasonError {
    #[error("a retire or void reason must contain more than whitespace")]
    Blank,
    #[error("reason is {0} characters long, the server keeps at most {MAX_REASON_CHARS}")]
    TooLong(usize),
}

/// Upper bound of the `retire_reason`/`void_reason` columns.
pub const MAX_REASON_CHARS: usize = 255;

/// Why a location or user is retired, or a record voided.
///
/// OpenMRS stores an empty reason as "retired without reason", which the `DELETE` endpoints then
/// refuse, so blank input is caught before the request. Surrounding whitespace is dropped.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RetireReason(String);

impl RetireReason {
    pub fn new(text: &str) -> Result<Self, ReasonError> {
        let text = text.trim();
        match text.chars().count() {
            0 => Err(ReasonError::Blank),
            n if n > MAX_REASON_CHARS => Err(ReasonError::TooLong(n)),
            _ => Ok(Self(text.to_owned())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RetireReason {
    type Error = ReasonError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        Self::new(&text)
    }
}

impl From<RetireReason> for String {
    fn from(reason: RetireReason) -> Self {
        reason.0
    }
}

impl std::str::FromStr for RetireReason {
    type Err = ReasonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for RetireReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_is_trimmed() {
        let reason = RetireReason::new("  Location is no longer in use ").unwrap();
        assert_eq!(reason.as_str(), "Location is no longer in use");
    }

    #[test]
    fn test_blank_and_oversized_reasons_rejected() {
        assert_eq!(RetireReason::new(" \t\n"), Err(ReasonError::Blank));
        let long = "x".repeat(MAX_REASON_CHARS + 1);
        assert_eq!(RetireReason::new(&long), Err(ReasonError::TooLong(256)));
        assert!(RetireReason::new(&"x".repeat(MAX_REASON_CHARS)).is_ok());
    }

    #[test]
    fn test_reason_as_json_string() {
        let reason: RetireReason = serde_json::from_str("\" duplicate \"").unwrap();
        assert_eq!(serde_json::to_string(&reason).unwrap(), "\"duplicate\"");
        assert!(serde_json::from_str::<RetireReason>("\"\"").is_err());
    }
}
