pub const API_BASE: &str = "https://api.twitter.com/2/";
pub const USER_AGENT: &str = concat!("follow-scout/", env!("CARGO_PKG_VERSION"));

/// Upper bound accepted by the followers/following endpoints.
pub const USER_LIST_MAX_RESULTS: u32 = 1000;
/// Bounds accepted by the user tweets endpoint.
pub const TWEETS_MIN_RESULTS: u32 = 5;
pub const TWEETS_MAX_RESULTS: u32 = 100;

pub const USER_FIELDS: &str = "public_metrics";
pub const RATE_LIMIT_RESET_HEADER: &str = "x-rate-limit-reset";
