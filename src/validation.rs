//! Input hygiene: HTML escaping, email/password checks, and a sliding-window
//! rate limiter for sign-in attempts.

#[cfg(test)]
#[path = "validation_test.rs"]
mod validation_test;

use std::collections::VecDeque;

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 128;
pub const MAX_EMAIL_LEN: usize = 254;
pub const MAX_INPUT_LEN: usize = 1000;

/// Escape characters that are significant in HTML text and attributes.
#[must_use]
pub fn sanitize_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            '`' => out.push_str("&#x60;"),
            '=' => out.push_str("&#x3D;"),
            c => out.push(c),
        }
    }
    out
}

/// `local@domain.tld` with no whitespace and at most 254 characters.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().count() > MAX_EMAIL_LEN || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    // Some dot must have text on both sides.
    domain
        .char_indices()
        .filter(|&(_, c)| c == '.')
        .any(|(i, _)| i > 0 && i + 1 < domain.len())
}

/// Problems found with a candidate password. Empty means acceptable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordIssue {
    TooShort,
    TooLong,
}

impl PasswordIssue {
    /// Catalog key for the message shown to the user.
    #[must_use]
    pub fn message_key(self) -> &'static str {
        match self {
            Self::TooShort | Self::TooLong => "errors.passwordLength",
        }
    }
}

/// Check length bounds, counted in characters.
#[must_use]
pub fn validate_password(password: &str) -> Vec<PasswordIssue> {
    let len = password.chars().count();
    let mut issues = Vec::new();
    if len < MIN_PASSWORD_LEN {
        issues.push(PasswordIssue::TooShort);
    }
    if len > MAX_PASSWORD_LEN {
        issues.push(PasswordIssue::TooLong);
    }
    issues
}

/// Trim, drop ASCII control characters, and cap the length.
#[must_use]
pub fn sanitize_input(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| !c.is_ascii_control())
        .take(MAX_INPUT_LEN)
        .collect()
}

/// Allows at most `max_calls` within any `interval_ms` window.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    max_calls: usize,
    interval_ms: i64,
    calls: VecDeque<i64>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(max_calls: usize, interval_ms: i64) -> Self {
        Self { max_calls, interval_ms, calls: VecDeque::with_capacity(max_calls) }
    }

    /// Record an attempt at `now_ms`. Returns `false` when the window is
    /// full; refused attempts are not recorded.
    pub fn check(&mut self, now_ms: i64) -> bool {
        while self.calls.front().is_some_and(|&t| t < now_ms - self.interval_ms) {
            self.calls.pop_front();
        }
        if self.calls.len() >= self.max_calls {
            return false;
        }
        self.calls.push_back(now_ms);
        true
    }
}
