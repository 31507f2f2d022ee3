//! Builds the canonical record from a submission that passed validation.

use chrono::{DateTime, Utc};

use crate::clock::{DateFormatter, DATE_PATTERN, TIME_PATTERN};
use crate::models::{NormalizedRecord, Submission};
use crate::rules::{IntakeRules, QTY_MAX, QTY_MIN};
use crate::sanitize::sanitize_opt;
use crate::validate::parse_quantity;

/// Status literal carried by every successfully written row.
pub const SUCCESS_STATUS: &str = "Success";

/// Recorded when the client address is not known.
pub const UNKNOWN_IP: &str = "Unknown";

/// Normalize `submission` as observed at `now`.
///
/// Total over any input: an unparseable or out-of-range quantity becomes an
/// empty cell instead of an error, since validation has already gated it.
pub fn normalize(
    submission: &Submission,
    now: DateTime<Utc>,
    client_ip: Option<&str>,
    rules: &IntakeRules,
    formatter: &dyn DateFormatter,
) -> NormalizedRecord {
    let max = rules.max_text_length;
    let qty = submission
        .qty
        .as_deref()
        .and_then(|q| parse_quantity(q, rules.quantity_parse))
        .filter(|n| (QTY_MIN..=QTY_MAX).contains(n));

    NormalizedRecord {
        date: formatter.format(now, DATE_PATTERN),
        time: formatter.format(now, TIME_PATTERN),
        name: sanitize_opt(submission.name.as_deref(), max),
        grade: sanitize_opt(submission.grade.as_deref(), max),
        kind: sanitize_opt(submission.kind.as_deref(), max),
        other: if rules.schema.has_other() {
            sanitize_opt(submission.other.as_deref(), max)
        } else {
            String::new()
        },
        qty,
        remark: sanitize_opt(submission.remark.as_deref(), max),
        status: SUCCESS_STATUS.to_string(),
        timestamp: now.timestamp_millis(),
        user_agent: sanitize_opt(submission.user_agent.as_deref(), max),
        ip: client_ip.unwrap_or(UNKNOWN_IP).to_string(),
    }
}
