use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteJournalMode};
use sqlx::ConnectOptions;
use std::path::Path;
use tracing::warn;

use crate::schema::TableSchema;

/// Create an empty database at `path`, replacing any previous file.
///
/// Every build is a full rebuild, so staging and consolidated stores are
/// never opened for append.
pub async fn create_fresh(path: &Path) -> Result<SqliteConnection> {
    if path.exists() {
        std::fs::remove_file(path)
            .with_context(|| format!("Failed to remove existing database: {}", path.display()))?;
    }

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let conn = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Delete)
        .connect()
        .await
        .with_context(|| format!("Failed to create database: {}", path.display()))?;

    Ok(conn)
}

/// Open an existing database for reading.
pub async fn open_read_only(path: &Path) -> Result<SqliteConnection> {
    if !path.is_file() {
        anyhow::bail!("Database does not exist: {}", path.display());
    }

    let conn = SqliteConnectOptions::new()
        .filename(path)
        .read_only(true)
        .connect()
        .await
        .with_context(|| format!("Failed to open database: {}", path.display()))?;

    Ok(conn)
}

/// Create a table if it is missing. Failures are logged, not raised; inserts
/// into a missing table fail on their own.
pub async fn create_table(conn: &mut SqliteConnection, table: &TableSchema) {
    let sql = table.create_sql();
    if let Err(e) = sqlx::query(&sql).execute(&mut *conn).await {
        warn!(table = table.name, statement = %sql, error = %e, "failed to create table");
    }
}
