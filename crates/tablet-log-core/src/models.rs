//! Data types that flow through the intake pipeline.
//!
//! A [`Submission`] is the untrusted request as received, a
//! [`NormalizedRecord`] is the cleaned record built from it, and a [`Row`]
//! is what the store persists. The caller only ever sees a [`Status`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::SchemaVariant;

/// Raw form submission. Every field is optional; absence is meaningful.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Submission {
    pub name: Option<String>,
    pub grade: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub qty: Option<String>,
    pub remark: Option<String>,
    pub other: Option<String>,
    #[serde(rename = "userAgent")]
    pub user_agent: Option<String>,
}

/// Named submission fields, used where fields are selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Grade,
    Type,
    Qty,
    Remark,
    Other,
    UserAgent,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Name,
        Field::Grade,
        Field::Type,
        Field::Qty,
        Field::Remark,
        Field::Other,
        Field::UserAgent,
    ];

    /// The parameter name as it appears on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Grade => "grade",
            Field::Type => "type",
            Field::Qty => "qty",
            Field::Remark => "remark",
            Field::Other => "other",
            Field::UserAgent => "userAgent",
        }
    }

    pub fn parse(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.as_str() == name)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Submission {
    pub fn get(&self, field: Field) -> Option<&str> {
        let value = match field {
            Field::Name => &self.name,
            Field::Grade => &self.grade,
            Field::Type => &self.kind,
            Field::Qty => &self.qty,
            Field::Remark => &self.remark,
            Field::Other => &self.other,
            Field::UserAgent => &self.user_agent,
        };
        value.as_deref()
    }

    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Name => &mut self.name,
            Field::Grade => &mut self.grade,
            Field::Type => &mut self.kind,
            Field::Qty => &mut self.qty,
            Field::Remark => &mut self.remark,
            Field::Other => &mut self.other,
            Field::UserAgent => &mut self.user_agent,
        }
    }

    /// Build a submission from `(name, value)` pairs. Unknown names are
    /// ignored; a repeated name keeps its first value.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut submission = Submission::default();
        for (key, value) in pairs {
            if let Some(field) = Field::parse(key.as_ref()) {
                let slot = submission.slot(field);
                if slot.is_none() {
                    *slot = Some(value.into());
                }
            }
        }
        submission
    }

    /// Fill every field this submission lacks from `fallback`.
    pub fn merge_missing(mut self, fallback: Submission) -> Self {
        for field in Field::ALL {
            let slot = self.slot(field);
            if slot.is_none() {
                *slot = fallback.get(field).map(str::to_string);
            }
        }
        self
    }
}

/// A single spreadsheet cell.
///
/// Serialized untagged: `null` for an empty cell, a JSON number for an
/// integer, a JSON string for text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Empty,
    Int(i64),
    Text(String),
}

impl Cell {
    /// True for an empty cell or an empty string.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Int(_) => false,
            Cell::Text(s) => s.is_empty(),
        }
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<Option<i64>> for Cell {
    fn from(v: Option<i64>) -> Self {
        v.map(Cell::Int).unwrap_or(Cell::Empty)
    }
}

/// One persisted row, in column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(Cell::is_blank)
    }

    /// The last cell, which is the status column in every layout.
    pub fn status(&self) -> Option<&Cell> {
        self.cells.last()
    }
}

/// Canonical record built from a validated submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    /// `YYYY/MM/DD` in the configured timezone.
    pub date: String,
    /// `HH:MM:SS` in the configured timezone.
    pub time: String,
    pub name: String,
    pub grade: String,
    pub kind: String,
    /// Always empty for [`SchemaVariant::WithoutOther`].
    pub other: String,
    /// In `1..=100` when present.
    pub qty: Option<i64>,
    pub remark: String,
    pub status: String,
    /// Epoch milliseconds. Informational, not persisted.
    pub timestamp: i64,
    /// Informational, not persisted.
    pub user_agent: String,
    /// Informational, not persisted.
    pub ip: String,
}

impl NormalizedRecord {
    /// Lay the record out as a row for the given schema.
    pub fn to_row(&self, schema: SchemaVariant) -> Row {
        let mut cells = vec![
            Cell::from(self.date.as_str()),
            Cell::from(self.time.as_str()),
            Cell::from(self.name.as_str()),
            Cell::from(self.grade.as_str()),
            Cell::from(self.kind.as_str()),
        ];
        if schema.has_other() {
            cells.push(Cell::from(self.other.as_str()));
        }
        cells.push(Cell::from(self.qty));
        cells.push(Cell::from(self.remark.as_str()));
        cells.push(Cell::from(self.status.as_str()));
        Row::new(cells)
    }
}

/// The only thing a caller learns about its submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    ValidationError,
    ServerError,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::ValidationError => "VALIDATION_ERROR",
            Status::ServerError => "SERVER_ERROR",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
