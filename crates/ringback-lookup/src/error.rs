use thiserror::Error;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("parse error: {0}")]
    Parse(String),
    #[error("webdriver error: {error}: {message}")]
    WebDriver { error: String, message: String },
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("unavailable: {0}")]
    Unavailable(String),
    #[cfg(feature = "remote")]
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[cfg(feature = "remote")]
    #[error("url error: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, LookupError>;
