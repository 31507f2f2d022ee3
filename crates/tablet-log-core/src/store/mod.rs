//! Row storage abstraction.
//!
//! The [`RowStore`] trait is the only way the pipeline touches the shared
//! sheet. It is append-only from the request path; header handling is
//! used out of band by [`ensure_headers`](crate::init::ensure_headers).
//!
//! Implementations must be `Send + Sync` and must serialize concurrent
//! appends themselves; the handler takes no locks.

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Cell, Row};

/// Failure reported by a [`RowStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The configured sheet does not exist in the backing store.
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    /// The store could not be reached or refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Error raised by the storage backend itself.
    #[error("storage backend error: {source}")]
    Backend {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl StoreError {
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        StoreError::Backend {
            source: Box::new(err),
        }
    }
}

/// Append-only tabular store.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`append_row`](RowStore::append_row) | Add a row after the last one |
/// | [`read_first_row`](RowStore::read_first_row) | Read row 1, padded to a width |
/// | [`write_header`](RowStore::write_header) | Overwrite row 1 with header labels |
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Append one row. Must be atomic with respect to other appends.
    async fn append_row(&self, row: &Row) -> Result<(), StoreError>;

    /// Read the first `width` cells of row 1. Missing cells, or a missing
    /// row, read as [`Cell::Empty`].
    async fn read_first_row(&self, width: usize) -> Result<Vec<Cell>, StoreError>;

    /// Write header labels into row 1. `bold` is a presentation hint that
    /// backends without styling may ignore.
    async fn write_header(&self, labels: &[&str], bold: bool) -> Result<(), StoreError>;
}

/// Pad or cut `cells` to exactly `width` entries.
pub fn fit_width(mut cells: Vec<Cell>, width: usize) -> Vec<Cell> {
    cells.resize(width, Cell::Empty);
    cells
}
