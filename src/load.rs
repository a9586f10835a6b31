//! Loads a filtered post stream into a per-source staging database.
//!
//! The stream is read with an event-driven XML reader, one element at a time.
//! Each `row` element's attributes are collected, coerced through the
//! staging schema, inserted, and dropped before the next event is read, so
//! memory use does not grow with the size of the stream.

use anyhow::{Context, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use sqlx::Connection;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

use crate::db;
use crate::progress::{ProgressEvent, ProgressReporter, Stage};
use crate::schema::{self, STAGING_ANSWERS, STAGING_QUESTIONS};

/// Rows written by one load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub questions: u64,
    pub answers: u64,
}

impl LoadStats {
    pub fn total(&self) -> u64 {
        self.questions + self.answers
    }
}

/// Options for a load run.
pub struct LoadOptions<'a> {
    /// Label used in progress events.
    pub source: &'a str,
    pub progress_every: u64,
    pub progress: &'a dyn ProgressReporter,
}

/// Convert the filtered stream at `input` into a fresh staging database at
/// `dbfile`. All rows are committed together once the stream is consumed.
pub async fn load(input: &Path, dbfile: &Path, options: &LoadOptions<'_>) -> Result<LoadStats> {
    info!(input = %input.display(), db = %dbfile.display(), "loading staging database");

    let file = File::open(input)
        .with_context(|| format!("Failed to open filtered file: {}", input.display()))?;

    let mut conn = db::create_fresh(dbfile).await?;
    db::create_table(&mut conn, &STAGING_QUESTIONS).await;
    db::create_table(&mut conn, &STAGING_ANSWERS).await;

    let insert_question = STAGING_QUESTIONS.insert_sql();
    let insert_answer = STAGING_ANSWERS.insert_sql();

    let mut reader = Reader::from_reader(BufReader::with_capacity(1024 * 1024, file));
    reader.config_mut().trim_text(true);

    let mut stats = LoadStats::default();
    let mut buf = Vec::with_capacity(8192);
    let mut tx = conn.begin().await?;

    loop {
        let attributes = match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => Some(read_attributes(&e)?),
            Ok(Event::Eof) => break,
            Ok(_) => None,
            Err(e) => {
                return Err(e).with_context(|| {
                    format!(
                        "Malformed XML in {} at byte {}",
                        input.display(),
                        reader.buffer_position()
                    )
                })
            }
        };
        buf.clear();

        let Some(mut attributes) = attributes else {
            continue;
        };
        let Some(post_type) = attributes.remove("PostTypeId") else {
            continue;
        };

        let (table, sql) = if post_type == "1" {
            stats.questions += 1;
            (&STAGING_QUESTIONS, &insert_question)
        } else {
            stats.answers += 1;
            (&STAGING_ANSWERS, &insert_answer)
        };

        let values = table.coerce(|column| attributes.remove(column));
        drop(attributes);

        schema::bind_values(sqlx::query(sql), values)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to insert into {}", table.name))?;

        let rows = stats.total();
        if options.progress_every > 0 && rows % options.progress_every == 0 {
            options.progress.report(ProgressEvent::Rows {
                source: options.source.to_string(),
                stage: Stage::Load,
                rows,
            });
        }
    }

    tx.commit().await?;
    conn.close().await?;

    info!(
        questions = stats.questions,
        answers = stats.answers,
        "total rows inserted: {}",
        stats.total()
    );
    Ok(stats)
}

/// Unescaped attribute values of one element, keyed by attribute name.
fn read_attributes(element: &BytesStart<'_>) -> Result<HashMap<String, String>> {
    let mut attributes = HashMap::new();
    for attr in element.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attributes.insert(key, value);
    }
    Ok(attributes)
}
