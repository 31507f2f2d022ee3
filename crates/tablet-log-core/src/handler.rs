//! Request handling: validate → normalize → append.
//!
//! [`IngestionHandler::handle`] is total. Whatever the submission or the
//! store does, it returns exactly one [`Status`]. Failures are recorded as
//! error rows on a best-effort basis and reported through `tracing`; they
//! never change the status already decided.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};

use crate::clock::{DateFormatter, FixedOffsetFormatter, DATE_PATTERN, TIME_PATTERN};
use crate::models::{Cell, Row, Status, Submission};
use crate::normalize::normalize;
use crate::rules::{IntakeRules, QTY_MAX, QTY_MIN};
use crate::sanitize::{sanitize_opt, sanitize_text};
use crate::store::RowStore;
use crate::validate::{parse_quantity, validate};

/// Error-row kind for rejected submissions.
pub const VALIDATION_FAILED: &str = "驗證失敗";
/// Error-row kind for store failures.
pub const SYSTEM_ERROR: &str = "系統錯誤";

/// Entry point invoked once per incoming submission.
#[derive(Clone)]
pub struct IngestionHandler {
    rules: Arc<IntakeRules>,
    store: Arc<dyn RowStore>,
    formatter: Arc<dyn DateFormatter>,
}

impl IngestionHandler {
    /// Handler formatting dates in `rules.timezone`.
    pub fn new(rules: IntakeRules, store: Arc<dyn RowStore>) -> Self {
        let formatter = Arc::new(FixedOffsetFormatter::new(rules.timezone));
        Self {
            rules: Arc::new(rules),
            store,
            formatter,
        }
    }

    /// Replace the date formatter.
    pub fn with_formatter(mut self, formatter: Arc<dyn DateFormatter>) -> Self {
        self.formatter = formatter;
        self
    }

    /// Process one submission with no known client address.
    pub async fn handle(&self, submission: &Submission) -> Status {
        self.handle_from(submission, None).await
    }

    /// Process one submission received from `client_ip`.
    pub async fn handle_from(&self, submission: &Submission, client_ip: Option<&str>) -> Status {
        let started = Instant::now();

        let result = validate(submission, &self.rules);
        if !result.is_valid() {
            let summary = result.summary();
            tracing::warn!(errors = %summary, "submission rejected");
            self.log_error(VALIDATION_FAILED, &summary, submission).await;
            return Status::ValidationError;
        }

        let record = normalize(
            submission,
            Utc::now(),
            client_ip,
            &self.rules,
            self.formatter.as_ref(),
        );
        let row = record.to_row(self.rules.schema);

        match self.store.append_row(&row).await {
            Ok(()) => {
                tracing::info!(
                    name = %record.name,
                    grade = %record.grade,
                    kind = %record.kind,
                    qty = ?record.qty,
                    ip = %record.ip,
                    user_agent = %record.user_agent,
                    timestamp = record.timestamp,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "submission recorded"
                );
                Status::Ok
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to append submission row");
                let detail = format!("Write failed: {}", err);
                self.log_error(SYSTEM_ERROR, &detail, submission).await;
                Status::ServerError
            }
        }
    }

    /// Append an error row describing a failed submission.
    ///
    /// Never fails: if the row cannot be written the problem is logged and
    /// dropped.
    pub async fn log_error(&self, kind: &str, detail: &str, submission: &Submission) {
        let row = self.error_row(kind, detail, submission, Utc::now());
        match self.store.append_row(&row).await {
            Ok(()) => tracing::debug!(kind, detail, "error row recorded"),
            Err(err) => tracing::error!(
                error = %err,
                kind,
                detail,
                "unable to log error to sheet"
            ),
        }
    }

    /// Same column layout as a success row, with whatever fields the
    /// submission carried and a `Failed: {kind} - {detail}` status.
    pub fn error_row(
        &self,
        kind: &str,
        detail: &str,
        submission: &Submission,
        now: DateTime<Utc>,
    ) -> Row {
        let max = self.rules.max_text_length;
        let text = |v: Option<&String>| Cell::from(sanitize_opt(v.map(String::as_str), max));

        let mut cells = vec![
            Cell::from(self.formatter.format(now, DATE_PATTERN)),
            Cell::from(self.formatter.format(now, TIME_PATTERN)),
            text(submission.name.as_ref()),
            text(submission.grade.as_ref()),
            text(submission.kind.as_ref()),
        ];
        if self.rules.schema.has_other() {
            cells.push(text(submission.other.as_ref()));
        }
        cells.push(self.error_qty_cell(submission.qty.as_deref()));
        cells.push(text(submission.remark.as_ref()));
        cells.push(Cell::from(sanitize_text(
            &format!("Failed: {} - {}", kind, detail),
            max,
        )));
        Row::new(cells)
    }

    // An in-range quantity is kept numeric; anything else is kept as the
    // cleaned text the client sent.
    fn error_qty_cell(&self, raw: Option<&str>) -> Cell {
        let Some(raw) = raw else {
            return Cell::Empty;
        };
        match parse_quantity(raw, self.rules.quantity_parse)
            .filter(|n| (QTY_MIN..=QTY_MAX).contains(n))
        {
            Some(n) => Cell::Int(n),
            None => {
                let cleaned = sanitize_text(raw, self.rules.max_text_length);
                if cleaned.is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(cleaned)
                }
            }
        }
    }
}
