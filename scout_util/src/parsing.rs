use thiserror::Error;

use url::Url;

pub const PROFILE_BASE_URL: &str = "https://twitter.com";

const PROFILE_HOSTS: &[&str] = &["twitter.com", "www.twitter.com", "mobile.twitter.com", "x.com", "www.x.com"];

#[derive(Debug, Clone, Error)]
pub enum ParsingError {
    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),
    #[error("Invalid profile URL: {0}")]
    InvalidUrl(String),
    #[error("Invalid handle: {0}")]
    InvalidHandle(String),
}

type Result<T> = std::result::Result<T, ParsingError>;

/// Lower-cased identity key of a handle. Handles are compared case-insensitively everywhere.
pub fn handle_key(handle: &str) -> String {
    handle.to_lowercase()
}

/// Directly openable profile reference for a handle.
pub fn profile_url(handle: &str) -> String {
    format!("{}/{}", PROFILE_BASE_URL, handle)
}

/// Parse user input into a bare handle. Accepts `name`, `@name` or a profile URL.
/// The original casing is kept; use [`handle_key`] for comparisons.
pub fn parse_handle(input: &str) -> Result<String> {
    let input = input.trim();
    let handle = if input.starts_with("http://") || input.starts_with("https://") {
        parse_profile_url(input)?
    } else {
        input.strip_prefix('@').unwrap_or(input).to_string()
    };
    validate_handle(&handle)?;
    Ok(handle)
}

/// Parse the handle from a profile URL, like `https://twitter.com/jack`.
pub fn parse_profile_url(url: &str) -> Result<String> {
    let parsed = Url::parse(url)?;
    let host = parsed.host_str().unwrap_or_default();
    if !PROFILE_HOSTS.contains(&host) {
        return Err(ParsingError::InvalidUrl(url.to_string()));
    }
    parsed
        .path_segments()
        .and_then(|mut segments| segments.next())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .ok_or(ParsingError::InvalidUrl(url.to_string()))
}

fn validate_handle(handle: &str) -> Result<()> {
    let valid = !handle.is_empty()
        && handle.len() <= 15
        && handle.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ParsingError::InvalidHandle(handle.to_string()))
    }
}
