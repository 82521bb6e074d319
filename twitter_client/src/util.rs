use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use reqwest::header::HeaderMap;

use crate::consts::RATE_LIMIT_RESET_HEADER;

/// The tweets endpoint only accepts `YYYY-MM-DDTHH:mm:ssZ`.
pub fn format_start_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Reset time of the current rate-limit window, sent as epoch seconds.
pub fn rate_limit_reset(headers: &HeaderMap) -> Option<DateTime<Utc>> {
    let value = headers.get(RATE_LIMIT_RESET_HEADER)?.to_str().ok()?;
    let seconds = value.trim().parse::<i64>().ok()?;
    Utc.timestamp_opt(seconds, 0).single()
}
