//! Live table metadata read from SQLite's catalog pragmas.

use crate::error::AppError;
use crate::model::{ColumnDescriptor, RawColumn};
use sqlx::SqlitePool;

/// User tables in the main database, in name order.
pub async fn list_tables(pool: &SqlitePool) -> Result<Vec<String>, AppError> {
    let names: Vec<(String,)> = sqlx::query_as(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )
    .fetch_all(pool)
    .await?;
    Ok(names.into_iter().map(|(n,)| n).collect())
}

pub async fn table_exists(pool: &SqlitePool, table: &str) -> Result<bool, AppError> {
    let found: Option<(i64,)> =
        sqlx::query_as("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?")
            .bind(table)
            .fetch_optional(pool)
            .await?;
    Ok(found.is_some())
}

pub async fn raw_columns(pool: &SqlitePool, table: &str) -> Result<Vec<RawColumn>, AppError> {
    let cols: Vec<RawColumn> = sqlx::query_as(
        r#"SELECT name, type, "notnull", dflt_value, pk FROM pragma_table_info(?) ORDER BY cid"#,
    )
    .bind(table)
    .fetch_all(pool)
    .await?;
    Ok(cols)
}

pub async fn foreign_key_columns(pool: &SqlitePool, table: &str) -> Result<Vec<String>, AppError> {
    let cols: Vec<(String,)> = sqlx::query_as(r#"SELECT "from" FROM pragma_foreign_key_list(?)"#)
        .bind(table)
        .fetch_all(pool)
        .await?;
    Ok(cols.into_iter().map(|(c,)| c).collect())
}

/// All columns of `table`, without any exclusions applied.
pub async fn describe(pool: &SqlitePool, table: &str) -> Result<Vec<ColumnDescriptor>, AppError> {
    let raw = raw_columns(pool, table).await?;
    if raw.is_empty() {
        return Err(AppError::NotFound(format!("table '{}'", table)));
    }
    let fks = foreign_key_columns(pool, table).await?;
    let pk_count = raw.iter().filter(|c| c.pk > 0).count();
    tracing::debug!(table = %table, columns = raw.len(), "described table");
    Ok(raw
        .iter()
        .map(|c| ColumnDescriptor::from_catalog(c, &fks, pk_count))
        .collect())
}
