use crate::error::CoreError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub email: String,
    pub first_name: String,
}

impl Contact {
    pub fn new(email: impl Into<String>, first_name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            first_name: first_name.into(),
        }
    }

    /// Rejects contacts the pipeline cannot meaningfully search for. A blank
    /// first name would match every returned name.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.email.trim().is_empty() {
            return Err(CoreError::EmptyEmail);
        }
        if self.first_name.trim().is_empty() {
            return Err(CoreError::EmptyFirstName);
        }
        Ok(())
    }
}
