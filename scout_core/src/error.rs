use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Cannot resolve account `{0}`")]
    Resolution(String),
    #[error("Rate Limit: {0}")]
    RateLimit(String),
    #[error("Timeout: {0}")]
    Timeout(String),
    #[error("Malformed page: {0}")]
    MalformedPage(String),
    #[error("Service error: {0}")]
    Service(String),
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO Error: {0}")]
    IOError(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Whether waiting out the rate-limit window may make the same request succeed.
    pub fn retryable(&self) -> bool {
        matches!(self, Error::RateLimit(_))
    }
}
