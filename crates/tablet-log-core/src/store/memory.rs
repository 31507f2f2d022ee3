//! In-memory [`RowStore`] for tests and embedding.
//!
//! Rows live in a `Vec` behind a `std::sync::RwLock`; row 1 is index 0.

use std::sync::RwLock;

use async_trait::async_trait;

use crate::models::{Cell, Row};

use super::{fit_width, RowStore, StoreError};

/// In-memory sheet.
pub struct InMemoryRowStore {
    rows: RwLock<Vec<Row>>,
    header_bold: RwLock<bool>,
}

impl InMemoryRowStore {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
            header_bold: RwLock::new(false),
        }
    }

    /// Copy of every row, in order.
    pub fn rows(&self) -> Vec<Row> {
        self.rows.read().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn header_is_bold(&self) -> bool {
        self.header_bold.read().map(|b| *b).unwrap_or(false)
    }

    fn poisoned() -> StoreError {
        StoreError::Unavailable("in-memory sheet lock poisoned".to_string())
    }
}

impl Default for InMemoryRowStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RowStore for InMemoryRowStore {
    async fn append_row(&self, row: &Row) -> Result<(), StoreError> {
        let mut rows = self.rows.write().map_err(|_| Self::poisoned())?;
        rows.push(row.clone());
        Ok(())
    }

    async fn read_first_row(&self, width: usize) -> Result<Vec<Cell>, StoreError> {
        let rows = self.rows.read().map_err(|_| Self::poisoned())?;
        let cells = rows.first().map(|r| r.cells.clone()).unwrap_or_default();
        Ok(fit_width(cells, width))
    }

    async fn write_header(&self, labels: &[&str], bold: bool) -> Result<(), StoreError> {
        let header = Row::new(labels.iter().map(|l| Cell::from(*l)).collect());
        let mut rows = self.rows.write().map_err(|_| Self::poisoned())?;
        match rows.first_mut() {
            Some(first) => *first = header,
            None => rows.push(header),
        }
        *self.header_bold.write().map_err(|_| Self::poisoned())? = bold;
        Ok(())
    }
}
