//! Wire-level primitives shared by the OpenMRS client, the response checks and the stub server.
//!
//! Nothing in here performs I/O. Types either mirror a shape the REST API emits
//! ([`Reference`], [`Gender`], REST date-times) or guard an input we send ([`RetireReason`]).

mod datetime;
mod gender;
mod reference;
mod reason;

pub use datetime::{format_rest_datetime, parse_birthdate, parse_rest_datetime, BIRTHDATE_FORMAT};
pub use gender::{Gender, GenderError};
pub use reference::Reference;
pub use reason::{ReasonError, RetireReason, MAX_REASON_CHARS};

/// Returns true if `value` parses as a UUID in any of its common textual forms.
///
/// OpenMRS uses hyphenated lowercase UUIDs, but some seeded metadata uses non-standard ids, so
/// this is only ever used to decide which error codes are acceptable, never to reject input.
pub fn is_uuid_like(value: &str) -> bool {
    !value.is_empty() && uuid::Uuid::parse_str(value).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_uuid_like() {
        assert!(is_uuid_like("8d94f852-c2cc-11de-8d13-0010c6dffd0f"));
        assert!(is_uuid_like("550e8400e29b41d4a716446655440000"));
        assert!(!is_uuid_like(""));
        assert!(!is_uuid_like("not-a-uuid"));
    }
}
