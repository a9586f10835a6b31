//! Consolidated database statistics.
//!
//! A quick read-only summary of a built questions database: how many rows it
//! holds, how they split across sources, and whether the full-text index
//! covers all of them. Used by `stackdump stats`.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{Connection, Row};
use std::path::Path;

use crate::db;

/// Per-source row counts and the most recent activity date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceStats {
    pub source: String,
    pub rows: i64,
    pub latest: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StoreStats {
    pub rows: i64,
    pub indexed: i64,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
    pub sources: Vec<SourceStats>,
}

/// Read the summary of the database at `path`.
pub async fn collect_stats(path: &Path) -> Result<StoreStats> {
    let mut conn = db::open_read_only(path).await?;

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions")
        .fetch_one(&mut conn)
        .await?;

    let indexed: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM search")
        .fetch_one(&mut conn)
        .await?;

    let source_rows = sqlx::query(
        r#"
        SELECT Source AS source, COUNT(*) AS row_count, MAX(Date) AS latest
        FROM questions
        GROUP BY Source
        ORDER BY MIN(Id)
        "#,
    )
    .fetch_all(&mut conn)
    .await?;

    let sources: Vec<SourceStats> = source_rows
        .iter()
        .map(|row| SourceStats {
            source: row.get("source"),
            rows: row.get("row_count"),
            latest: row.get("latest"),
        })
        .collect();

    conn.close().await?;

    let metadata = std::fs::metadata(path)?;
    Ok(StoreStats {
        rows,
        indexed,
        size: metadata.len(),
        modified: metadata.modified().ok().map(DateTime::<Utc>::from),
        sources,
    })
}

/// Run the stats command: query the database and print a summary.
pub async fn run_stats(path: &Path) -> Result<()> {
    let stats = collect_stats(path).await?;

    println!("Questions Database Stats");
    println!("========================");
    println!();
    println!("  Database:    {}", path.display());
    println!("  Size:        {}", format_bytes(stats.size));
    if let Some(modified) = stats.modified {
        println!("  Built:       {}", modified.format("%Y-%m-%d %H:%M"));
    }
    println!();
    println!("  Questions:   {}", stats.rows);
    println!("  Indexed:     {} / {}", stats.indexed, stats.rows);

    if !stats.sources.is_empty() {
        println!();
        println!("  By source:");
        println!("  {:<24} {:>10}   {}", "SOURCE", "ROWS", "LATEST ACTIVITY");
        println!("  {}", "-".repeat(60));

        for s in &stats.sources {
            println!(
                "  {:<24} {:>10}   {}",
                s.source,
                s.rows,
                s.latest.as_deref().unwrap_or("-")
            );
        }
    }

    println!();
    Ok(())
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}
