//! Utility functions for Tranca
//!
//! Common helper functions used across the codebase.

use std::sync::LazyLock;
use std::time::Duration;

/// Regex pattern for validating lock keys and key prefixes
static VALID_KEY_PATTERN: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new("^[a-zA-Z0-9_.:-]+$").expect("Invalid regex pattern"));

/// Validate a lock key
///
/// A valid key is non-empty and contains only alphanumeric characters,
/// underscore, dot, colon and hyphen.
///
/// # Examples
///
/// ```
/// use tranca_common::is_valid_key;
///
/// assert!(is_valid_key("exam:grading"));
/// assert!(is_valid_key("report_job.daily"));
/// assert!(!is_valid_key(""));
/// assert!(!is_valid_key("with spaces"));
/// ```
pub fn is_valid_key(key: &str) -> bool {
    VALID_KEY_PATTERN.is_match(key)
}

/// Parse a duration string (e.g., "15s", "1m", "1h", "500ms")
///
/// A bare number is interpreted as seconds.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use tranca_common::parse_duration;
///
/// assert_eq!(parse_duration("15s"), Some(Duration::from_secs(15)));
/// assert_eq!(parse_duration("500ms"), Some(Duration::from_millis(500)));
/// assert_eq!(parse_duration("abc"), None);
/// ```
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (num_str, unit_ms) = if let Some(stripped) = s.strip_suffix("ms") {
        (stripped, 1u64)
    } else if let Some(stripped) = s.strip_suffix('s') {
        (stripped, 1000u64)
    } else if let Some(stripped) = s.strip_suffix('m') {
        (stripped, 60_000u64)
    } else if let Some(stripped) = s.strip_suffix('h') {
        (stripped, 3_600_000u64)
    } else {
        (s, 1000u64) // default to seconds
    };

    let num: u64 = num_str.parse().ok()?;
    num.checked_mul(unit_ms).map(Duration::from_millis)
}

/// Current unix time in milliseconds
pub fn current_unix_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
