//! One-time sheet setup.

use crate::schema::SchemaVariant;
use crate::store::{RowStore, StoreError};

/// Write the header row for `schema` if row 1 is entirely blank.
///
/// Returns `true` when headers were written and `false` when row 1 already
/// had content. Safe to call any number of times.
pub async fn ensure_headers(
    store: &dyn RowStore,
    schema: SchemaVariant,
    bold: bool,
) -> Result<bool, StoreError> {
    let width = schema.column_count();
    let first = store.read_first_row(width).await?;
    if first.iter().any(|cell| !cell.is_blank()) {
        tracing::debug!("sheet already has a header row");
        return Ok(false);
    }

    store.write_header(schema.headers(), bold).await?;
    tracing::info!(columns = width, "sheet headers initialized");
    Ok(true)
}
