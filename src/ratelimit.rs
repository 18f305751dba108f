use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;

const RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";
const RATELIMIT_RESET: &str = "x-ratelimit-reset";

/// Wait used when a rate-limit response names no delay of its own
pub const DEFAULT_FALLBACK_WAIT: Duration = Duration::from_secs(60);

/// How long to wait before retrying, if the response is a rate-limit signal.
///
/// GitHub signals throttling with 403 or 429. `Retry-After` wins when present.
/// An exhausted primary limit (`x-ratelimit-remaining: 0`) waits until
/// `x-ratelimit-reset`. A secondary limit, recognised from the error body, or
/// any 429 waits until `x-ratelimit-reset` if given and `fallback` otherwise.
/// Any other 403 is a real failure and yields `None`.
pub fn retry_delay(
    status: StatusCode,
    headers: &HeaderMap,
    body: &str,
    now: DateTime<Utc>,
    fallback: Duration,
) -> Option<Duration> {
    if status != StatusCode::FORBIDDEN && status != StatusCode::TOO_MANY_REQUESTS {
        return None;
    }

    if let Some(secs) = header_u64(headers, RETRY_AFTER.as_str()) {
        return Some(Duration::from_secs(secs));
    }

    let exhausted = header_u64(headers, RATELIMIT_REMAINING) == Some(0);
    if exhausted || status == StatusCode::TOO_MANY_REQUESTS || is_secondary_limit(body) {
        return Some(until_reset(headers, now).unwrap_or(fallback));
    }

    None
}

/// Whether an error body describes a secondary (abuse detection) limit
pub fn is_secondary_limit(body: &str) -> bool {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return false;
    };

    ["message", "documentation_url"].iter().any(|field| {
        value[*field].as_str().is_some_and(|text| {
            let text = text.to_ascii_lowercase();
            text.contains("secondary rate limit") || text.contains("secondary-rate-limit")
        })
    })
}

fn until_reset(headers: &HeaderMap, now: DateTime<Utc>) -> Option<Duration> {
    let reset = i64::try_from(header_u64(headers, RATELIMIT_RESET)?).ok()?;
    let secs = reset.saturating_sub(now.timestamp()).max(0);
    Some(Duration::from_secs(secs as u64))
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}
