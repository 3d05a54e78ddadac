//! Wall-clock time in milliseconds since the Unix epoch.

/// Current time in milliseconds. Uses `Date.now()` in the browser.
#[cfg(feature = "hydrate")]
#[must_use]
pub fn now_ms() -> i64 {
    #[allow(clippy::cast_possible_truncation)]
    let now = js_sys::Date::now() as i64;
    now
}

/// Current time in milliseconds. A clock before the epoch reads as 0.
#[cfg(not(feature = "hydrate"))]
#[must_use]
pub fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
}
