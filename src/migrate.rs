use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

/// Create the sheet tables and register the configured sheet.
///
/// Idempotent.
pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    migrate_pool(&pool, &config.sheet.name).await?;
    pool.close().await;
    Ok(())
}

pub async fn migrate_pool(pool: &SqlitePool, sheet: &str) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sheets (
            name TEXT PRIMARY KEY,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // One row per spreadsheet row; `cells` is a JSON array.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sheet_rows (
            sheet TEXT NOT NULL,
            row_num INTEGER NOT NULL,
            cells TEXT NOT NULL,
            bold INTEGER NOT NULL DEFAULT 0,
            appended_at INTEGER NOT NULL,
            PRIMARY KEY (sheet, row_num),
            FOREIGN KEY (sheet) REFERENCES sheets(name)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("INSERT OR IGNORE INTO sheets (name, created_at) VALUES (?, ?)")
        .bind(sheet)
        .bind(chrono::Utc::now().timestamp())
        .execute(pool)
        .await?;

    Ok(())
}
