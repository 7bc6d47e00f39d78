//! Modulus-30 check-character computation and the validated identifier type.

use crate::{IdentifierError, IdentifierResult};
use rand::rngs::ThreadRng;
use rand::Rng;
use std::{fmt, str::FromStr};

/// The 30 symbols accepted by the Mod30 validator, in value order.
pub const MOD30_ALPHABET: [char; 30] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K',
    'L', 'M', 'N', 'P', 'R', 'T', 'U', 'V', 'W', 'X', 'Y',
];

/// Payload length used by the server's own identifier source (7 symbols + 1 check character).
pub const DEFAULT_PAYLOAD_LENGTH: usize = 7;

const BASE: u32 = MOD30_ALPHABET.len() as u32;

/// Returns the value (alphabet index) of `symbol`, or `None` when it is not in the alphabet.
pub fn symbol_value(symbol: char) -> Option<u32> {
    MOD30_ALPHABET
        .iter()
        .position(|&c| c == symbol)
        .map(|i| i as u32)
}

fn symbol_values(input: &str) -> IdentifierResult<Vec<u32>> {
    input
        .chars()
        .enumerate()
        .map(|(position, symbol)| {
            symbol_value(symbol).ok_or(IdentifierError::InvalidSymbol { symbol, position })
        })
        .collect()
}

/// Right-to-left weighted sum, reduced modulo 30. `double_first` says whether the rightmost
/// value is doubled.
fn weighted_sum<I>(values: I, double_first: bool) -> u32
where
    I: DoubleEndedIterator<Item = u32>,
{
    let mut total = 0;
    let mut double = double_first;
    for value in values.rev() {
        let mut v = value;
        if double {
            v *= 2;
            v = v / BASE + v % BASE;
        }
        total = (total + v) % BASE;
        double = !double;
    }
    total
}

/// Computes the check character for `payload`.
///
/// # Errors
///
/// Returns [`IdentifierError::EmptyPayload`] for an empty payload and
/// [`IdentifierError::InvalidSymbol`] for any character outside [`MOD30_ALPHABET`].
pub fn compute_check_character(payload: &str) -> IdentifierResult<char> {
    if payload.is_empty() {
        return Err(IdentifierError::EmptyPayload);
    }
    let values = symbol_values(payload)?;
    let total = weighted_sum(values.into_iter(), true);
    let check = (BASE - total) % BASE;
    Ok(MOD30_ALPHABET[check as usize])
}

/// Returns true if the last character of `identifier` is the correct check character for the
/// rest of it.
///
/// This is the rule the server applies: the whole string is summed with the rightmost symbol
/// left undoubled, and the total must be a multiple of 30.
///
/// # Errors
///
/// Returns [`IdentifierError::EmptyPayload`] when `identifier` has fewer than two characters
/// and [`IdentifierError::InvalidSymbol`] for characters outside the alphabet.
pub fn validate_identifier(identifier: &str) -> IdentifierResult<bool> {
    let values = symbol_values(identifier)?;
    if values.len() < 2 {
        return Err(IdentifierError::EmptyPayload);
    }
    Ok(weighted_sum(values.into_iter(), false) == 0)
}

/// Source of alphabet symbols for identifier generation.
///
/// Production code uses [`RandomSymbols`]; tests substitute a deterministic source.
pub trait SymbolSource {
    /// Returns the next symbol. Must be a member of [`MOD30_ALPHABET`].
    fn next_symbol(&mut self) -> char;
}

/// Uniformly random symbols drawn from an [`rand::Rng`].
#[derive(Debug, Clone)]
pub struct RandomSymbols<R = ThreadRng> {
    rng: R,
}

impl RandomSymbols<ThreadRng> {
    /// Symbols drawn from the thread-local generator.
    pub fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }
}

impl Default for RandomSymbols<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> RandomSymbols<R> {
    /// Symbols drawn from a caller-supplied generator (for example a seeded `StdRng`).
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> SymbolSource for RandomSymbols<R> {
    fn next_symbol(&mut self) -> char {
        MOD30_ALPHABET[self.rng.gen_range(0..MOD30_ALPHABET.len())]
    }
}

/// An identifier whose trailing character is a correct Mod30 check character.
///
/// # Construction
/// - [`Mod30Identifier::generate`] draws a fresh payload from a [`SymbolSource`].
/// - [`Mod30Identifier::from_payload`] appends the check character to a known payload.
/// - [`Mod30Identifier::parse`] validates an externally supplied identifier.
///
/// Once constructed the value always passes [`validate_identifier`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Mod30Identifier(String);

impl Mod30Identifier {
    /// Generates a new identifier with `payload_length` random symbols plus the check character.
    ///
    /// Identifiers are not guaranteed unique. With the default length a collision needs
    /// 30^7 draws on average.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::EmptyPayload`] when `payload_length` is zero.
    pub fn generate<S: SymbolSource + ?Sized>(
        payload_length: usize,
        source: &mut S,
    ) -> IdentifierResult<Self> {
        let payload: String = (0..payload_length).map(|_| source.next_symbol()).collect();
        Self::from_payload(&payload)
    }

    /// Appends the check character to `payload`.
    ///
    /// # Errors
    ///
    /// Same as [`compute_check_character`].
    pub fn from_payload(payload: &str) -> IdentifierResult<Self> {
        let check = compute_check_character(payload)?;
        let mut value = String::with_capacity(payload.len() + 1);
        value.push_str(payload);
        value.push(check);
        Ok(Self(value))
    }

    /// Validates an identifier that already carries its check character.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::InvalidSymbol`] or [`IdentifierError::EmptyPayload`] as
    /// [`validate_identifier`] does, and [`IdentifierError::CheckCharacterMismatch`] when every
    /// symbol is in the alphabet but the last one is not the payload's check character.
    pub fn parse(input: &str) -> IdentifierResult<Self> {
        if validate_identifier(input)? {
            return Ok(Self(input.to_owned()));
        }
        // Validation passed the alphabet check, so every char is one ASCII byte.
        let (payload, found) = input.split_at(input.len() - 1);
        Err(IdentifierError::CheckCharacterMismatch {
            expected: compute_check_character(payload)?,
            found: found.chars().next().unwrap_or_default(),
        })
    }

    /// The payload without its check character.
    pub fn payload(&self) -> &str {
        // All alphabet symbols are ASCII, so the last char is exactly one byte.
        &self.0[..self.0.len() - 1]
    }

    /// The trailing check character.
    pub fn check_character(&self) -> char {
        self.0.chars().last().unwrap_or('0')
    }

    /// The full identifier (payload followed by check character).
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Generates an identifier of `payload_length` random symbols plus its check character.
///
/// # Errors
///
/// Returns [`IdentifierError::EmptyPayload`] when `payload_length` is zero.
pub fn generate_identifier(payload_length: usize) -> IdentifierResult<Mod30Identifier> {
    Mod30Identifier::generate(payload_length, &mut RandomSymbols::new())
}

impl fmt::Display for Mod30Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Mod30Identifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mod30Identifier::parse(s)
    }
}

impl AsRef<str> for Mod30Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Mod30Identifier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Mod30Identifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Mod30Identifier::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Cycles through a fixed list of symbols.
    struct Scripted {
        symbols: Vec<char>,
        next: usize,
    }

    impl Scripted {
        fn new(symbols: &str) -> Self {
            Self {
                symbols: symbols.chars().collect(),
                next: 0,
            }
        }
    }

    impl SymbolSource for Scripted {
        fn next_symbol(&mut self) -> char {
            let symbol = self.symbols[self.next % self.symbols.len()];
            self.next += 1;
            symbol
        }
    }

    #[test]
    fn test_alphabet_has_thirty_unique_symbols_without_lookalikes() {
        let mut sorted = MOD30_ALPHABET.to_vec();
        sorted.dedup();
        assert_eq!(sorted.len(), 30);
        for lookalike in ['B', 'I', 'O', 'Q', 'S', 'Z'] {
            assert!(symbol_value(lookalike).is_none(), "{lookalike} must be excluded");
        }
    }

    #[test]
    fn test_symbol_value_is_alphabet_position() {
        assert_eq!(symbol_value('0'), Some(0));
        assert_eq!(symbol_value('9'), Some(9));
        assert_eq!(symbol_value('A'), Some(10));
        assert_eq!(symbol_value('C'), Some(11));
        assert_eq!(symbol_value('Y'), Some(29));
        assert_eq!(symbol_value('a'), None);
    }

    #[test]
    fn test_known_check_characters() {
        assert_eq!(compute_check_character("1234567").unwrap(), 'H');
        assert_eq!(compute_check_character("0000000").unwrap(), '0');
        assert_eq!(compute_check_character("YYYYYYY").unwrap(), '7');
        assert_eq!(compute_check_character("ACDEFGH").unwrap(), '6');
        assert_eq!(compute_check_character("100001").unwrap(), 'W');
        assert_eq!(compute_check_character("Y").unwrap(), '1');
        assert_eq!(compute_check_character("1").unwrap(), 'X');
    }

    #[test]
    fn test_check_character_is_deterministic() {
        for payload in ["1234567", "ACDEFGH", "9XY0", "7"] {
            assert_eq!(
                compute_check_character(payload).unwrap(),
                compute_check_character(payload).unwrap()
            );
        }
    }

    #[test]
    fn test_payload_plus_check_sums_to_multiple_of_thirty() {
        let mut source = RandomSymbols::with_rng(StdRng::seed_from_u64(7));
        for length in 1..=12 {
            for _ in 0..50 {
                let payload: String = (0..length).map(|_| source.next_symbol()).collect();
                let check = compute_check_character(&payload).unwrap();
                let full = format!("{payload}{check}");
                let values = symbol_values(&full).unwrap();
                assert_eq!(weighted_sum(values.into_iter(), false), 0, "{full}");
                assert!(validate_identifier(&full).unwrap());
            }
        }
    }

    #[test]
    fn test_compute_rejects_lowercase_symbol() {
        let err = compute_check_character("12a4567").expect_err("lowercase must be rejected");
        assert!(matches!(
            err,
            IdentifierError::InvalidSymbol {
                symbol: 'a',
                position: 2
            }
        ));
    }

    #[test]
    fn test_compute_rejects_hash_and_lookalikes() {
        assert!(matches!(
            compute_check_character("#"),
            Err(IdentifierError::InvalidSymbol { symbol: '#', .. })
        ));
        assert!(matches!(
            compute_check_character("10O"),
            Err(IdentifierError::InvalidSymbol { symbol: 'O', .. })
        ));
    }

    #[test]
    fn test_compute_rejects_empty_payload() {
        assert!(matches!(
            compute_check_character(""),
            Err(IdentifierError::EmptyPayload)
        ));
    }

    #[test]
    fn test_validate_detects_single_substitution() {
        assert!(validate_identifier("1234567H").unwrap());
        assert!(!validate_identifier("1234568H").unwrap());
        assert!(!validate_identifier("1234567J").unwrap());
    }

    #[test]
    fn test_validate_detects_adjacent_transposition() {
        assert!(validate_identifier("1234567H").unwrap());
        assert!(!validate_identifier("2134567H").unwrap());
    }

    #[test]
    fn test_validate_rejects_too_short() {
        assert!(matches!(
            validate_identifier("H"),
            Err(IdentifierError::EmptyPayload)
        ));
        assert!(matches!(
            validate_identifier(""),
            Err(IdentifierError::EmptyPayload)
        ));
    }

    #[test]
    fn test_generate_default_length_produces_eight_characters() {
        let id = Mod30Identifier::generate(DEFAULT_PAYLOAD_LENGTH, &mut RandomSymbols::new())
            .unwrap();
        assert_eq!(id.as_str().len(), 8);
        assert_eq!(id.payload().len(), 7);
        assert_eq!(
            id.check_character(),
            compute_check_character(id.payload()).unwrap()
        );
    }

    #[test]
    fn test_generate_uses_injected_source() {
        let mut source = Scripted::new("1234567");
        let id = Mod30Identifier::generate(7, &mut source).unwrap();
        assert_eq!(id.as_str(), "1234567H");
        assert_eq!(id.payload(), "1234567");
        assert_eq!(id.check_character(), 'H');
    }

    #[test]
    fn test_generate_rejects_zero_length() {
        let mut source = Scripted::new("1");
        assert!(matches!(
            Mod30Identifier::generate(0, &mut source),
            Err(IdentifierError::EmptyPayload)
        ));
    }

    #[test]
    fn test_parse_accepts_valid_and_rejects_wrong_check() {
        let parsed: Mod30Identifier = "100001W".parse().unwrap();
        assert_eq!(parsed.payload(), "100001");

        let err = Mod30Identifier::parse("100001X").expect_err("wrong check character");
        assert!(matches!(
            err,
            IdentifierError::CheckCharacterMismatch {
                expected: 'W',
                found: 'X'
            }
        ));
    }

    #[test]
    fn test_parse_separates_mismatch_from_unknown_symbol() {
        let err = Mod30Identifier::parse("1234567J").expect_err("J is not the check character");
        assert!(matches!(
            err,
            IdentifierError::CheckCharacterMismatch {
                expected: 'H',
                found: 'J'
            }
        ));
        assert_eq!(
            err.to_string(),
            "check character 'J' does not match payload, expected 'H'"
        );
        assert!(matches!(
            Mod30Identifier::parse("1234567B"),
            Err(IdentifierError::InvalidSymbol {
                symbol: 'B',
                position: 7
            })
        ));
    }

    #[test]
    fn test_weighted_sum_stays_reduced_for_huge_payloads() {
        // 160M symbols of value 29 would exceed u32::MAX if summed unreduced.
        let count = 160_000_000;
        let total = weighted_sum(std::iter::repeat_n(29, count), false);
        // Doubling 29 folds back to 29 (58 -> 1 + 28).
        assert_eq!(u64::from(total), count as u64 * 29 % 30);
    }

    #[test]
    fn test_display_is_full_identifier() {
        let id = Mod30Identifier::from_payload("ACDEFGH").unwrap();
        assert_eq!(id.to_string(), "ACDEFGH6");
    }

    #[test]
    fn test_serde_uses_plain_string_and_validates() {
        let id = Mod30Identifier::from_payload("1234567").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"1234567H\"");

        let back: Mod30Identifier = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);

        assert!(serde_json::from_str::<Mod30Identifier>("\"1234567J\"").is_err());
    }
}
