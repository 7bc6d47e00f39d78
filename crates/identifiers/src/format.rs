//! Values for regex-described identifier formats.
//!
//! Identifier types on the server carry an optional `format` regular expression. Writing a
//! general regex-to-string generator is not worth it: only the formats actually configured on
//! the target deployment are supported, and anything else is reported as unsupported.

use crate::{IdentifierError, IdentifierResult};
use rand::Rng;
use regex::Regex;

/// One uppercase letter, a hyphen and seven digits, e.g. `K-0482913`.
pub const LETTER_HYPHEN_SEVEN_DIGITS: &str = "^[A-Z]{1}-[0-9]{7}$";

const UPPERCASE: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8; 10] = b"0123456789";

/// Returns true if [`generate_from_format`] can produce a value for `format`.
pub fn is_supported_format(format: &str) -> bool {
    format == LETTER_HYPHEN_SEVEN_DIGITS
}

/// Returns true if `pattern` matches the *whole* of `value`.
///
/// # Errors
///
/// Returns [`IdentifierError::InvalidPattern`] if `pattern` does not compile.
pub fn full_match(pattern: &str, value: &str) -> IdentifierResult<bool> {
    let anchored = Regex::new(&format!(r"\A(?:{pattern})\z"))?;
    Ok(anchored.is_match(value))
}

/// Generates a value satisfying `format`, drawing randomness from `rng`.
///
/// # Errors
///
/// - [`IdentifierError::UnsupportedFormat`] for any format other than
///   [`LETTER_HYPHEN_SEVEN_DIGITS`].
/// - [`IdentifierError::FormatMismatch`] if the generated value fails its own format.
pub fn generate_from_format<R: Rng>(format: &str, rng: &mut R) -> IdentifierResult<String> {
    if !is_supported_format(format) {
        return Err(IdentifierError::UnsupportedFormat(format.to_owned()));
    }

    let mut value = String::with_capacity(9);
    value.push(UPPERCASE[rng.gen_range(0..UPPERCASE.len())] as char);
    value.push('-');
    for _ in 0..7 {
        value.push(DIGITS[rng.gen_range(0..DIGITS.len())] as char);
    }

    if !full_match(format, &value)? {
        return Err(IdentifierError::FormatMismatch {
            format: format.to_owned(),
            value,
        });
    }
    Ok(value)
}

/// [`generate_from_format`] using the thread-local generator.
pub fn generate_from_regex_format(format: &str) -> IdentifierResult<String> {
    generate_from_format(format, &mut rand::thread_rng())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generates_nine_character_matching_value() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let value = generate_from_format(LETTER_HYPHEN_SEVEN_DIGITS, &mut rng).unwrap();
            assert_eq!(value.len(), 9);
            assert!(full_match(LETTER_HYPHEN_SEVEN_DIGITS, &value).unwrap());
            assert!(value.as_bytes()[0].is_ascii_uppercase());
            assert_eq!(value.as_bytes()[1], b'-');
            assert!(value[2..].bytes().all(|b| b.is_ascii_digit()));
        }
    }

    #[test]
    fn test_thread_rng_convenience() {
        let value = generate_from_regex_format(LETTER_HYPHEN_SEVEN_DIGITS).unwrap();
        assert!(full_match(LETTER_HYPHEN_SEVEN_DIGITS, &value).unwrap());
    }

    #[test]
    fn test_unknown_format_is_unsupported() {
        let err = generate_from_regex_format("^[0-9]{6}$").expect_err("should be unsupported");
        assert!(matches!(err, IdentifierError::UnsupportedFormat(f) if f == "^[0-9]{6}$"));
    }

    #[test]
    fn test_near_miss_format_is_unsupported() {
        // Same shape, different spelling: still rejected, formats are compared literally.
        assert!(!is_supported_format("^[A-Z]-[0-9]{7}$"));
        assert!(!is_supported_format("[A-Z]{1}-[0-9]{7}"));
    }

    #[test]
    fn test_full_match_requires_whole_string() {
        assert!(full_match("[0-9]{3}", "123").unwrap());
        assert!(!full_match("[0-9]{3}", "1234").unwrap());
        assert!(!full_match("[0-9]{3}", "x123").unwrap());
        assert!(full_match("a|ab", "ab").unwrap());
    }

    #[test]
    fn test_full_match_reports_bad_pattern() {
        assert!(matches!(
            full_match("([A-Z", "A"),
            Err(IdentifierError::InvalidPattern(_))
        ));
    }
}
