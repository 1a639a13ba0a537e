use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("phone candidate must contain only digits: {0}")]
    InvalidCandidate(String),
    #[error("phone candidate is empty")]
    EmptyCandidate,
    #[error("contact email is required")]
    EmptyEmail,
    #[error("contact first_name is required")]
    EmptyFirstName,
}
