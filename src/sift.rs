//! Stream filter over a raw `Posts.xml` dump.
//!
//! Dumps are written one `<row .../>` per line in ascending `Id` order, and
//! an accepted answer always follows its question. That lets a single
//! forward pass over raw lines keep only qualifying questions and the
//! answers they accept, holding nothing but the set of answer ids still
//! expected. Lines are matched as bytes and copied verbatim.

use anyhow::{Context, Result};
use regex::bytes::Regex;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, info};

/// Score a question needs for its accepted answer to be kept.
pub const MIN_SCORE: i64 = 10;

static RE_ACCEPTED_MARKER: OnceLock<Regex> = OnceLock::new();
static RE_ANSWER_MARKER: OnceLock<Regex> = OnceLock::new();
static RE_ACCEPTED_ID: OnceLock<Regex> = OnceLock::new();
static RE_SCORE: OnceLock<Regex> = OnceLock::new();
static RE_ID: OnceLock<Regex> = OnceLock::new();

fn re(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("valid sift pattern"))
}

fn accepted_marker() -> &'static Regex {
    re(&RE_ACCEPTED_MARKER, "AcceptedAnswerId")
}
fn answer_marker() -> &'static Regex {
    re(&RE_ANSWER_MARKER, r#"PostTypeId="2""#)
}
fn accepted_id() -> &'static Regex {
    re(&RE_ACCEPTED_ID, r#"\bAcceptedAnswerId="([0-9]+)""#)
}
fn score() -> &'static Regex {
    re(&RE_SCORE, r#"\bScore="([0-9]+)""#)
}
fn post_id() -> &'static Regex {
    re(&RE_ID, r#"\bId="([0-9]+)""#)
}

/// Counts from one filter pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiftStats {
    pub lines: u64,
    pub questions: u64,
    pub answers: u64,
    /// Accepted answer ids that never showed up after their question.
    pub unresolved: u64,
}

/// Integer captured by `pattern`, or -1 when the field is absent.
pub fn parse_field(pattern: &Regex, line: &[u8]) -> i64 {
    pattern
        .captures(line)
        .and_then(|c| c.get(1))
        .and_then(|m| std::str::from_utf8(m.as_bytes()).ok())
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(-1)
}

/// Filter `input` into `output`, keeping questions scored at least
/// `min_score` that have an accepted answer, plus those answers.
pub fn sift(input: &Path, output: &Path, min_score: i64) -> Result<SiftStats> {
    info!(input = %input.display(), output = %output.display(), "sifting posts");

    let reader = File::open(input)
        .with_context(|| format!("Failed to open posts file: {}", input.display()))?;
    let writer = File::create(output)
        .with_context(|| format!("Failed to create filtered file: {}", output.display()))?;

    let mut reader = BufReader::with_capacity(1024 * 1024, reader);
    let mut writer = BufWriter::with_capacity(1024 * 1024, writer);

    let stats = sift_stream(&mut reader, &mut writer, min_score)
        .with_context(|| format!("Failed to sift {}", input.display()))?;
    writer.flush()?;

    info!(
        lines = stats.lines,
        questions = stats.questions,
        answers = stats.answers,
        "sift complete"
    );
    Ok(stats)
}

/// The filter itself, over any line source and sink.
pub fn sift_stream<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    min_score: i64,
) -> Result<SiftStats> {
    let mut stats = SiftStats::default();
    let mut pending: HashSet<i64> = HashSet::new();
    let mut line = Vec::with_capacity(8192);

    writer.write_all(b"<posts>\n")?;

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        stats.lines += 1;

        let keep = if accepted_marker().is_match(&line) {
            let answer = parse_field(accepted_id(), &line);
            if parse_field(score(), &line) >= min_score {
                pending.insert(answer);
                stats.questions += 1;
                true
            } else {
                false
            }
        } else if answer_marker().is_match(&line) {
            let id = parse_field(post_id(), &line);
            if pending.remove(&id) {
                stats.answers += 1;
                true
            } else {
                false
            }
        } else {
            false
        };

        if keep {
            writer.write_all(&line)?;
            if line.last() != Some(&b'\n') {
                writer.write_all(b"\n")?;
            }
        }
    }

    writer.write_all(b"</posts>\n")?;

    stats.unresolved = pending.len() as u64;
    if !pending.is_empty() {
        debug!(count = pending.len(), "accepted answers not found in dump");
    }

    Ok(stats)
}
