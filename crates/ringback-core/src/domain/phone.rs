use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A digit-only phone number produced by [`normalize_candidate`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneCandidate(String);

impl PhoneCandidate {
    pub fn new(digits: impl Into<String>) -> Result<Self, CoreError> {
        let digits = digits.into();
        if digits.is_empty() {
            return Err(CoreError::EmptyCandidate);
        }
        if !digits.chars().all(|ch| ch.is_ascii_digit()) {
            return Err(CoreError::InvalidCandidate(digits));
        }
        Ok(Self(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PhoneCandidate {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.trim())
    }
}

impl TryFrom<String> for PhoneCandidate {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PhoneCandidate> for String {
    fn from(value: PhoneCandidate) -> Self {
        value.0
    }
}

/// Keeps only ASCII digits, then drops a leading `88`, or failing that a
/// leading `1`. The prefix check is purely textual: a national number that
/// happens to begin with `1` loses that digit too.
pub fn normalize_candidate(raw: &str) -> Option<PhoneCandidate> {
    let digits: String = raw.chars().filter(|ch| ch.is_ascii_digit()).collect();
    let stripped = if let Some(rest) = digits.strip_prefix("88") {
        rest
    } else if let Some(rest) = digits.strip_prefix('1') {
        rest
    } else {
        digits.as_str()
    };
    if stripped.is_empty() {
        return None;
    }
    Some(PhoneCandidate(stripped.to_string()))
}
