//! SQLite-backed [`RowStore`] implementation.
//!
//! Each sheet is a set of `sheet_rows` records keyed by `(sheet, row_num)`,
//! with row numbers starting at 1 and cells stored as a JSON array. The
//! sheet itself must have been registered by
//! [`run_migrations`](crate::migrate::run_migrations); until then every
//! operation fails with [`StoreError::SheetNotFound`].

use async_trait::async_trait;
use sqlx::SqlitePool;

use tablet_log_core::models::{Cell, Row};
use tablet_log_core::store::{fit_width, RowStore, StoreError};

/// SQLite implementation of the [`RowStore`] trait for one named sheet.
pub struct SqliteRowStore {
    pool: SqlitePool,
    sheet: String,
}

impl SqliteRowStore {
    pub fn new(pool: SqlitePool, sheet: impl Into<String>) -> Self {
        Self {
            pool,
            sheet: sheet.into(),
        }
    }

    /// Every row of the sheet in row order, with its bold flag.
    pub async fn rows(&self) -> Result<Vec<(Row, bool)>, StoreError> {
        self.ensure_sheet().await?;
        let records: Vec<(String, bool)> = sqlx::query_as(
            "SELECT cells, bold FROM sheet_rows WHERE sheet = ? ORDER BY row_num",
        )
        .bind(&self.sheet)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        records
            .into_iter()
            .map(|(cells, bold)| Ok((decode_row(&cells)?, bold)))
            .collect()
    }

    async fn ensure_sheet(&self) -> Result<(), StoreError> {
        let has_table: bool = sqlx::query_scalar(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = 'table' AND name = 'sheets'",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        let registered = has_table
            && sqlx::query_scalar::<_, bool>("SELECT COUNT(*) > 0 FROM sheets WHERE name = ?")
                .bind(&self.sheet)
                .fetch_one(&self.pool)
                .await
                .map_err(StoreError::backend)?;

        if registered {
            Ok(())
        } else {
            Err(StoreError::SheetNotFound(self.sheet.clone()))
        }
    }
}

fn encode_row(row: &Row) -> Result<String, StoreError> {
    serde_json::to_string(row).map_err(StoreError::backend)
}

fn decode_row(cells: &str) -> Result<Row, StoreError> {
    serde_json::from_str(cells).map_err(StoreError::backend)
}

#[async_trait]
impl RowStore for SqliteRowStore {
    async fn append_row(&self, row: &Row) -> Result<(), StoreError> {
        self.ensure_sheet().await?;
        let cells = encode_row(row)?;

        // Numbering happens inside the INSERT so concurrent appends never
        // compute the same row number.
        sqlx::query(
            r#"
            INSERT INTO sheet_rows (sheet, row_num, cells, bold, appended_at)
            SELECT ?, COALESCE(MAX(row_num), 0) + 1, ?, 0, ?
            FROM sheet_rows WHERE sheet = ?
            "#,
        )
        .bind(&self.sheet)
        .bind(&cells)
        .bind(chrono::Utc::now().timestamp_millis())
        .bind(&self.sheet)
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(())
    }

    async fn read_first_row(&self, width: usize) -> Result<Vec<Cell>, StoreError> {
        self.ensure_sheet().await?;
        let cells: Option<String> =
            sqlx::query_scalar("SELECT cells FROM sheet_rows WHERE sheet = ? AND row_num = 1")
                .bind(&self.sheet)
                .fetch_optional(&self.pool)
                .await
                .map_err(StoreError::backend)?;

        let first = match cells {
            Some(json) => decode_row(&json)?.cells,
            None => Vec::new(),
        };
        Ok(fit_width(first, width))
    }

    async fn write_header(&self, labels: &[&str], bold: bool) -> Result<(), StoreError> {
        self.ensure_sheet().await?;
        let header = Row::new(labels.iter().map(|l| Cell::from(*l)).collect());
        let cells = encode_row(&header)?;

        sqlx::query(
            r#"
            INSERT INTO sheet_rows (sheet, row_num, cells, bold, appended_at)
            VALUES (?, 1, ?, ?, ?)
            ON CONFLICT(sheet, row_num) DO UPDATE SET
                cells = excluded.cells,
                bold = excluded.bold
            "#,
        )
        .bind(&self.sheet)
        .bind(&cells)
        .bind(bold)
        .bind(chrono::Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(())
    }
}
