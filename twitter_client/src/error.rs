use chrono::{DateTime, Utc};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[allow(clippy::enum_variant_names)]
#[derive(Error, Debug)]
pub enum Error {
    #[error("Rate limited (window resets at {reset:?})")]
    RateLimited { reset: Option<DateTime<Utc>> },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("API error {status}: {detail}")]
    Api { status: u16, detail: String },
    #[error("Invalid bearer token")]
    InvalidToken,
    #[error("Cannot decode JSON: {0}")]
    JSONError(#[from] serde_path_to_error::Error<serde_json::Error>),
    #[error("IO Error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Network Error: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("Cannot parse URL: {0}")]
    UrlError(#[from] url::ParseError),
}
