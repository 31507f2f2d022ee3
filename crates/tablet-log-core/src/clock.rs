//! Date formatting in a fixed UTC offset.
//!
//! Rows carry wall-clock date and time for a single site, so a fixed
//! offset is enough; no DST-aware zone database is involved.

use chrono::{DateTime, FixedOffset, Offset, Utc};

/// Pattern for the Date column (`2024/03/01`).
pub const DATE_PATTERN: &str = "%Y/%m/%d";
/// Pattern for the Time column (`08:30:00`).
pub const TIME_PATTERN: &str = "%H:%M:%S";

const DEFAULT_OFFSET_SECS: i32 = 8 * 3600;

/// Renders an instant with a strftime-style pattern.
pub trait DateFormatter: Send + Sync {
    fn format(&self, instant: DateTime<Utc>, pattern: &str) -> String;
}

/// [`DateFormatter`] for a constant UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct FixedOffsetFormatter {
    offset: FixedOffset,
}

impl FixedOffsetFormatter {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }
}

impl DateFormatter for FixedOffsetFormatter {
    fn format(&self, instant: DateTime<Utc>, pattern: &str) -> String {
        instant.with_timezone(&self.offset).format(pattern).to_string()
    }
}

/// GMT+8.
pub fn default_timezone() -> FixedOffset {
    FixedOffset::east_opt(DEFAULT_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Parse `GMT+8`, `UTC-03:30`, `+0530`, `+08:00`, `GMT`, or `UTC`.
pub fn parse_timezone(input: &str) -> Option<FixedOffset> {
    let s = input.trim();
    let rest = s
        .strip_prefix("GMT")
        .or_else(|| s.strip_prefix("UTC"))
        .unwrap_or(s);
    if rest.is_empty() {
        return FixedOffset::east_opt(0);
    }

    let (sign, body) = match rest.as_bytes()[0] {
        b'+' => (1, &rest[1..]),
        b'-' => (-1, &rest[1..]),
        _ => return None,
    };

    let (hours, minutes) = match body.split_once(':') {
        Some((h, m)) => (h, m),
        None if body.len() == 4 && body.is_ascii() => body.split_at(2),
        None => (body, "0"),
    };
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 14 || minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
