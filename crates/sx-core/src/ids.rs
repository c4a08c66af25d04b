//! Image identifiers and the random generator that mints them.
//!
//! Ids are short strings drawn from a fixed 36-symbol alphabet that leaves out
//! vowels and look-alike glyphs. Ten symbols give roughly 51.7 bits of entropy.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Symbols an [`AlphabetIdGenerator`] draws from by default.
pub const ID_ALPHABET: &str = "6789BCDFGHJKLMNPQRTWbcdfghjkmnpqrtwz";

/// Length of generated ids, and the minimum length accepted from clients.
pub const ID_LENGTH: usize = 10;

/// Identifier shared by an image's metadata record and its stored object.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(transparent)]
pub struct ImageId(String);

impl ImageId {
    /// Accept an id taken from a request path.
    ///
    /// Anything shorter than [`ID_LENGTH`] characters is rejected with the same
    /// message as a missing id.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.chars().count() < ID_LENGTH {
            return Err(Error::missing_parameter("id"));
        }
        Ok(Self(raw.to_string()))
    }

    /// Borrow the id as a store key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ImageId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl AsRef<str> for ImageId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Source of fresh image ids.
pub trait IdGenerator: Send + Sync {
    /// Mint a new id. No uniqueness check is made against existing records.
    fn generate(&self) -> ImageId;
}

/// Uniform random ids over a fixed alphabet.
#[derive(Debug, Clone)]
pub struct AlphabetIdGenerator {
    alphabet: Vec<char>,
    length: usize,
}

impl AlphabetIdGenerator {
    /// Build a generator for a custom alphabet and length.
    pub fn new(alphabet: &str, length: usize) -> Result<Self> {
        let alphabet: Vec<char> = alphabet.chars().collect();
        if alphabet.is_empty() {
            return Err(Error::Validation("id alphabet must not be empty".into()));
        }
        if length == 0 {
            return Err(Error::Validation("id length must be at least 1".into()));
        }
        Ok(Self { alphabet, length })
    }

    /// Number of symbols in the alphabet.
    pub fn alphabet_len(&self) -> usize {
        self.alphabet.len()
    }

    /// Bits of entropy carried by one generated id.
    pub fn entropy_bits(&self) -> f64 {
        self.length as f64 * (self.alphabet.len() as f64).log2()
    }
}

impl Default for AlphabetIdGenerator {
    fn default() -> Self {
        Self {
            alphabet: ID_ALPHABET.chars().collect(),
            length: ID_LENGTH,
        }
    }
}

impl IdGenerator for AlphabetIdGenerator {
    fn generate(&self) -> ImageId {
        let mut rng = rand::thread_rng();
        let id: String = (0..self.length)
            .map(|_| self.alphabet[rng.gen_range(0..self.alphabet.len())])
            .collect();
        ImageId(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ids_use_alphabet_and_length() {
        let generator = AlphabetIdGenerator::default();
        for _ in 0..500 {
            let id = generator.generate();
            assert_eq!(id.as_str().len(), ID_LENGTH);
            assert!(
                id.as_str().chars().all(|c| ID_ALPHABET.contains(c)),
                "unexpected symbol in {id}"
            );
        }
    }

    #[test]
    fn alphabet_has_36_symbols() {
        let generator = AlphabetIdGenerator::default();
        assert_eq!(generator.alphabet_len(), 36);
        let bits = generator.entropy_bits();
        assert!((bits - 51.7).abs() < 0.05, "entropy was {bits}");
    }

    #[test]
    fn ids_vary() {
        let generator = AlphabetIdGenerator::default();
        let a = generator.generate();
        let b = generator.generate();
        assert_ne!(a, b);
    }

    #[test]
    fn custom_generator() {
        let generator = AlphabetIdGenerator::new("x", 12).unwrap();
        assert_eq!(generator.generate().as_str(), "xxxxxxxxxxxx");
    }

    #[test]
    fn custom_generator_rejects_empty_alphabet() {
        assert!(AlphabetIdGenerator::new("", 10).is_err());
        assert!(AlphabetIdGenerator::new("abc", 0).is_err());
    }

    #[test]
    fn parse_accepts_ten_or_more() {
        assert_eq!(ImageId::parse("BCDFGHJKLM").unwrap().as_str(), "BCDFGHJKLM");
        assert!(ImageId::parse("BCDFGHJKLMNP").is_ok());
    }

    #[test]
    fn parse_rejects_short() {
        let err = ImageId::parse("short").unwrap_err();
        assert_eq!(err.to_string(), "Missing `id` parameter.");
        assert!(ImageId::parse("").is_err());
        assert!("BCDFGHJKL".parse::<ImageId>().is_err());
    }

    #[test]
    fn serde_is_transparent() {
        let id = ImageId::parse("BCDFGHJKLM").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"BCDFGHJKLM\"");
    }
}
