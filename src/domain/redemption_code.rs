//! Opaque single-use redemption code.
//!
//! [`RedemptionCode`] wraps the token a customer presents to a business
//! scanner. Codes are drawn from the thread-local CSPRNG with enough
//! entropy that collisions and guessing are both negligible; they carry
//! no deal or user identifiers.

use std::fmt;

use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};

/// Number of random alphanumeric characters in a generated code.
const CODE_CHARS: usize = 20;

/// Characters per dash-separated group, for manual entry.
const GROUP_LEN: usize = 5;

/// Opaque redemption code string.
///
/// Generated once at code-request time and immutable thereafter. The
/// exact string is what gets rendered into the QR image and typed into
/// the scanner, so the charset stays URL-safe (alphanumeric plus `-`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RedemptionCode(String);

impl RedemptionCode {
    /// Wraps a scanned or typed code, trimming surrounding whitespace.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_string())
    }

    /// Generates a fresh random code from the thread CSPRNG.
    #[must_use]
    pub fn generate() -> Self {
        let chars: Vec<char> = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(CODE_CHARS)
            .map(char::from)
            .collect();

        let grouped = chars
            .chunks(GROUP_LEN)
            .map(|group| group.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("-");

        Self(grouped)
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the wrapped code is empty after trimming.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RedemptionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RedemptionCode {
    fn from(code: String) -> Self {
        Self::new(code)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn generate_produces_unique_codes() {
        let a = RedemptionCode::generate();
        let b = RedemptionCode::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn generated_code_has_expected_shape() {
        let code = RedemptionCode::generate();
        let groups: Vec<&str> = code.as_str().split('-').collect();
        assert_eq!(groups.len(), CODE_CHARS / GROUP_LEN);
        for group in groups {
            assert_eq!(group.len(), GROUP_LEN);
            assert!(group.chars().all(char::is_alphanumeric));
        }
    }

    #[test]
    fn new_trims_whitespace() {
        let code = RedemptionCode::new("  ABCDE-FGHIJ  ");
        assert_eq!(code.as_str(), "ABCDE-FGHIJ");
    }

    #[test]
    fn serde_round_trip() {
        let code = RedemptionCode::generate();
        let json = serde_json::to_string(&code).ok();
        let Some(json) = json else {
            panic!("serialization failed");
        };
        let Ok(deserialized) = serde_json::from_str::<RedemptionCode>(&json) else {
            panic!("deserialization failed");
        };
        assert_eq!(code, deserialized);
    }
}
