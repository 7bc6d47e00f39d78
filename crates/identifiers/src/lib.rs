//! Patient identifier generation and check-character validation.
//!
//! OpenMRS validates the "OpenMRS ID" identifier type with a modulus-30 variant of the Luhn
//! algorithm (`LuhnMod30IdentifierValidator`). Any identifier we submit must carry a trailing
//! check character computed exactly the way the server recomputes it, or patient creation is
//! rejected with a 400.
//!
//! This crate provides:
//! - The fixed 30-symbol alphabet and the check-character computation ([`compute_check_character`]).
//! - Full-identifier validation ([`validate_identifier`]).
//! - A value type ([`Mod30Identifier`]) that *guarantees* a consistent check character once
//!   constructed.
//! - Random generation through an injected [`SymbolSource`], so tests can drive it
//!   deterministically.
//! - Generation of values for the regex-described identifier formats configured on the target
//!   deployment ([`generate_from_regex_format`]).
//!
//! ## Alphabet
//! `0123456789ACDEFGHJKLMNPRTUVWXY`
//!
//! The letters `B`, `I`, `O`, `Q`, `S` and `Z` are left out because they are easily mistaken for
//! digits when read back from a wristband or a printed label.
//!
//! ## Check character
//! The payload is scanned right to left. The symbol immediately left of where the check
//! character will sit is doubled first, then every second symbol after it. A doubled value is
//! folded back into base 30 (`v / 30 + v % 30`). The check value is
//! `(30 - total % 30) % 30`.
//!
//! Appending the check character yields a string whose own sum (rightmost symbol never doubled)
//! is a multiple of 30.

mod checksum;
mod format;

pub use checksum::{
    compute_check_character, generate_identifier, symbol_value, validate_identifier,
    Mod30Identifier, RandomSymbols, SymbolSource, DEFAULT_PAYLOAD_LENGTH, MOD30_ALPHABET,
};
pub use format::{
    full_match, generate_from_format, generate_from_regex_format, is_supported_format,
    LETTER_HYPHEN_SEVEN_DIGITS,
};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum IdentifierError {
    /// A character outside the modulus-30 alphabet.
    #[error("unallowed character '{symbol}' at position {position} for Mod30 identifier")]
    InvalidSymbol { symbol: char, position: usize },

    /// Every symbol is valid but the trailing one is not the payload's check character.
    #[error("check character '{found}' does not match payload, expected '{expected}'")]
    CheckCharacterMismatch { expected: char, found: char },

    /// A payload (or identifier) too short to carry a checksum.
    #[error("identifier payload cannot be empty")]
    EmptyPayload,

    /// A regex identifier format this generator does not know how to satisfy.
    #[error("unsupported identifier format: {0}")]
    UnsupportedFormat(String),

    /// The format string is not a valid regular expression.
    #[error("invalid identifier format pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// A generated value failed its own format. This is a bug in the generator.
    #[error("generated value '{value}' does not match format {format}")]
    FormatMismatch { format: String, value: String },
}

/// Result type for identifier operations.
pub type IdentifierResult<T> = Result<T, IdentifierError>;
