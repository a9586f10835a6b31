//! Consolidates per-source staging databases into one questions database.
//!
//! Each staging question is joined with its accepted answer, given the next
//! global id, and written to a single `questions` table. Sources are taken in
//! the order supplied, which fixes the id assignment. Once every source is in,
//! a `(Source, SourceId)` index and the FTS5 `search` table are built and the
//! whole database is committed in one go.

use anyhow::{Context, Result};
use sqlx::{Connection, Row, SqliteConnection};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::db;
use crate::models::{ConsolidatedQuestion, StagingAnswer, StagingQuestion};
use crate::progress::{ProgressEvent, ProgressReporter, Stage};
use crate::schema::{self, CONSOLIDATED};
use crate::sources::{self, Source};

const CREATE_SOURCE_INDEX: &str = "CREATE INDEX source ON questions(Source, SourceId)";
const CREATE_TEXT_INDEX: &str = "CREATE VIRTUAL TABLE search USING fts5(Id, Question, Tags)";
const INSERT_TEXT_ROWS: &str = "INSERT INTO search SELECT Id, Question, Tags FROM questions";

const PROGRESS_EVERY: u64 = 10_000;

/// Rows produced by a consolidation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsolidateStats {
    pub rows: u64,
    /// Rows per source, in processing order.
    pub per_source: Vec<(String, u64)>,
    /// Questions dropped because their accepted answer was missing or empty.
    pub skipped: u64,
}

/// Source key of a staging database: its lower-cased file stem.
pub fn source_key(dbfile: &Path) -> Option<String> {
    dbfile
        .file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
}

/// Tag list with the angle-bracket delimiters removed, space separated.
pub fn normalize_tags(raw: Option<&str>) -> String {
    raw.map(|tags| {
        tags.replace(['<', '>'], " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    })
    .unwrap_or_default()
}

/// Display name, or the numeric owner id when there is none.
pub fn display_name(name: Option<&str>, owner_user_id: i64) -> String {
    match name {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => owner_user_id.to_string(),
    }
}

/// Join a question with its accepted answer. `None` when the answer has no body.
pub fn build_row(
    id: i64,
    source: &Source,
    question: &StagingQuestion,
    answer: &StagingAnswer,
) -> Option<ConsolidatedQuestion> {
    let body = answer.body.as_deref().filter(|b| !b.is_empty())?;

    Some(ConsolidatedQuestion {
        id,
        source: source.key.to_string(),
        source_id: question.id,
        date: question.last_activity_date.clone(),
        tags: normalize_tags(question.tags.as_deref()),
        question: question.title.clone(),
        question_user: display_name(
            question.owner_display_name.as_deref(),
            question.owner_user_id,
        ),
        answer: body.to_string(),
        answer_user: display_name(answer.owner_display_name.as_deref(), answer.owner_user_id),
        reference: source.reference(question.id),
    })
}

/// Consolidate `databases` into a new database at `output`.
pub async fn consolidate(
    databases: &[PathBuf],
    output: &Path,
    progress: &dyn ProgressReporter,
) -> Result<ConsolidateStats> {
    info!(sources = databases.len(), output = %output.display(), "consolidating");

    // Resolve every source up front so an unknown one fails before any work
    let mut inputs = Vec::with_capacity(databases.len());
    for dbfile in databases {
        let key = source_key(dbfile)
            .with_context(|| format!("Invalid staging database path: {}", dbfile.display()))?;
        let source = sources::find(&key).with_context(|| {
            format!("Unknown source '{}' for {}", key, dbfile.display())
        })?;
        inputs.push((dbfile, source));
    }

    let mut qa = db::create_fresh(output).await?;
    db::create_table(&mut qa, &CONSOLIDATED).await;

    let insert = CONSOLIDATED.insert_sql();
    let mut stats = ConsolidateStats::default();
    let mut tx = qa.begin().await?;

    for (dbfile, source) in inputs {
        info!(source = source.key, db = %dbfile.display(), "processing");
        progress.report(ProgressEvent::Started {
            source: source.key.to_string(),
            stage: Stage::Consolidate,
        });

        let mut staging = db::open_read_only(dbfile).await?;
        let questions = fetch_questions(&mut staging)
            .await
            .with_context(|| format!("Failed to read questions from {}", dbfile.display()))?;

        let mut inserted = 0u64;
        for question in &questions {
            let Some(answer) = find_answer(&mut staging, question.accepted_answer_id).await? else {
                stats.skipped += 1;
                continue;
            };
            let Some(row) = build_row(stats.rows as i64, source, question, &answer) else {
                stats.skipped += 1;
                continue;
            };

            let values = CONSOLIDATED.coerce(|column| row.field(column).map(|v| v.into_owned()));
            schema::bind_values(sqlx::query(&insert), values)
                .execute(&mut *tx)
                .await
                .context("Failed to insert consolidated question")?;

            stats.rows += 1;
            inserted += 1;
            if stats.rows % PROGRESS_EVERY == 0 {
                progress.report(ProgressEvent::Rows {
                    source: source.key.to_string(),
                    stage: Stage::Consolidate,
                    rows: stats.rows,
                });
            }
        }

        staging.close().await?;
        stats.per_source.push((source.key.to_string(), inserted));
    }

    info!(rows = stats.rows, skipped = stats.skipped, "total rows inserted");

    for statement in [CREATE_SOURCE_INDEX, CREATE_TEXT_INDEX, INSERT_TEXT_ROWS] {
        sqlx::query(statement)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to build index: {}", statement))?;
    }

    tx.commit().await?;
    qa.close().await?;

    Ok(stats)
}

async fn fetch_questions(conn: &mut SqliteConnection) -> Result<Vec<StagingQuestion>> {
    let rows = sqlx::query(
        "SELECT Id, AcceptedAnswerId, OwnerUserId, OwnerDisplayName, LastActivityDate, Title, Tags \
         FROM questions ORDER BY Id",
    )
    .fetch_all(&mut *conn)
    .await?;

    rows.iter()
        .map(|row| -> Result<StagingQuestion> {
            Ok(StagingQuestion {
                id: row.try_get("Id")?,
                accepted_answer_id: row.try_get("AcceptedAnswerId")?,
                owner_user_id: row.try_get("OwnerUserId")?,
                owner_display_name: row.try_get("OwnerDisplayName")?,
                last_activity_date: row.try_get("LastActivityDate")?,
                title: row.try_get("Title")?,
                tags: row.try_get("Tags")?,
            })
        })
        .collect()
}

async fn find_answer(conn: &mut SqliteConnection, id: i64) -> Result<Option<StagingAnswer>> {
    let row = sqlx::query("SELECT Body, OwnerUserId, OwnerDisplayName FROM answers WHERE Id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    Ok(Some(StagingAnswer {
        body: row.try_get("Body")?,
        owner_user_id: row.try_get("OwnerUserId")?,
        owner_display_name: row.try_get("OwnerDisplayName")?,
    }))
}
