//! Duration-string grammar shared by recipe metadata and instructions.
//!
//! A duration string matches `(Nd )?(Nh )?(Nm)?`, case-insensitively, with
//! optional whitespace between units. Parsing never produces a
//! `std::time::Duration`; callers only need to validate the grammar and,
//! occasionally, total minutes for display.

use once_cell::sync::Lazy;
use regex::Regex;

static DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:\s*(\d+)\s*d)?(?:\s*(\d+)\s*h)?(?:\s*(\d+)\s*m)?\s*$").expect("valid regex")
});

static TIMESTAMP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+:[0-5]\d$").expect("valid regex"));

/// Returns whether `s` matches the duration-string grammar
/// `^(\d+d\s*)?(\d+h\s*)?(\d+m)?$` (case-insensitive).
///
/// An empty string matches (all components absent): callers treat that as
/// "no duration supplied" at a higher layer, not as a validation error.
pub fn is_valid(s: &str) -> bool {
    DURATION_RE.is_match(s)
}

/// Parses a duration string into total minutes, if it matches the grammar
/// and carries at least one component.
pub fn total_minutes(s: &str) -> Option<u64> {
    let caps = DURATION_RE.captures(s)?;
    if caps.iter().skip(1).all(|c| c.is_none()) {
        return None;
    }
    let days: u64 = caps.get(1).map_or(0, |m| m.as_str().parse().unwrap_or(0));
    let hours: u64 = caps.get(2).map_or(0, |m| m.as_str().parse().unwrap_or(0));
    let minutes: u64 = caps.get(3).map_or(0, |m| m.as_str().parse().unwrap_or(0));
    Some(days * 24 * 60 + hours * 60 + minutes)
}

/// Returns whether `s` matches a video's `MM:SS` timestamp grammar —
/// distinct from the `(Nd )?(Nh )?(Nm)?` duration grammar above, which
/// never applies to [`crate::recipe::Media::Video`].
pub fn is_valid_timestamp(s: &str) -> bool {
    TIMESTAMP_RE.is_match(s)
}
