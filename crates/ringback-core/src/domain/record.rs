use crate::domain::phone::PhoneCandidate;
use serde::{Deserialize, Serialize};

/// One confirmed row of the results file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub first_name: String,
    pub phone_number: PhoneCandidate,
}

impl MatchRecord {
    pub fn new(first_name: impl Into<String>, phone_number: PhoneCandidate) -> Self {
        Self {
            first_name: first_name.into(),
            phone_number,
        }
    }
}
