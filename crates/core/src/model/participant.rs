use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParticipantError {
    #[error("participant id must be exactly 3 letters, got {len}")]
    InvalidLength { len: usize },

    #[error("participant id must contain only ASCII letters: {raw}")]
    InvalidCharacter { raw: String },
}

//
// ─── PARTICIPANT ID ────────────────────────────────────────────────────────────
//

/// Three-letter participant identifier, normalized to uppercase.
///
/// Doubles as the display label for the rater and as the key that
/// partitions persisted sessions, one session per identifier.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Parses and normalizes a raw identifier.
    ///
    /// Leading/trailing whitespace is trimmed and letters are uppercased.
    ///
    /// # Errors
    ///
    /// Returns `ParticipantError` if the trimmed input is not exactly
    /// three ASCII letters.
    pub fn parse(raw: &str) -> Result<Self, ParticipantError> {
        let trimmed = raw.trim();
        if trimmed.len() != 3 {
            return Err(ParticipantError::InvalidLength { len: trimmed.len() });
        }
        if !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ParticipantError::InvalidCharacter {
                raw: trimmed.to_string(),
            });
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// Returns the normalized identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ParticipantId({})", self.0)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ParticipantId {
    type Err = ParticipantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ParticipantId {
    type Error = ParticipantError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ParticipantId> for String {
    fn from(id: ParticipantId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes_to_uppercase() {
        let id = ParticipantId::parse("abc").unwrap();
        assert_eq!(id.as_str(), "ABC");
    }

    #[test]
    fn parse_trims_whitespace() {
        let id = ParticipantId::parse("  xyz ").unwrap();
        assert_eq!(id.as_str(), "XYZ");
    }

    #[test]
    fn parse_rejects_wrong_length() {
        let err = ParticipantId::parse("ab").unwrap_err();
        assert!(matches!(err, ParticipantError::InvalidLength { len: 2 }));
        assert!(ParticipantId::parse("abcd").is_err());
        assert!(ParticipantId::parse("").is_err());
    }

    #[test]
    fn parse_rejects_non_letters() {
        let err = ParticipantId::parse("a1c").unwrap_err();
        assert!(matches!(err, ParticipantError::InvalidCharacter { .. }));
    }

    #[test]
    fn serde_round_trip_validates() {
        let id = ParticipantId::parse("JKL").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"JKL\"");
        let back: ParticipantId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);

        let bad: Result<ParticipantId, _> = serde_json::from_str("\"toolong\"");
        assert!(bad.is_err());
    }
}
