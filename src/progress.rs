//! Build progress reporting.
//!
//! Reports what the pipeline is doing while it works through multi-gigabyte
//! dumps. Progress is emitted on **stderr** so stdout stays reserved for the
//! final row counts.

use std::io::Write;

/// Stage of a per-source build.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Stage {
    Extract,
    Sift,
    Load,
    Consolidate,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Extract => "extract",
            Stage::Sift => "sift",
            Stage::Load => "load",
            Stage::Consolidate => "consolidate",
        }
    }
}

/// A single progress event.
#[derive(Clone, Debug)]
pub enum ProgressEvent {
    /// A stage started for this source.
    Started { source: String, stage: Stage },
    /// Running row count within a stage.
    Rows {
        source: String,
        stage: Stage,
        rows: u64,
    },
}

/// Receives progress events from the pipeline stages.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// Human-friendly progress on stderr: "unix  load  20,000 rows".
pub struct StderrProgress;

impl ProgressReporter for StderrProgress {
    fn report(&self, event: ProgressEvent) {
        let line = match &event {
            ProgressEvent::Started { source, stage } => {
                format!("{}  {}...\n", source, stage.as_str())
            }
            ProgressEvent::Rows {
                source,
                stage,
                rows,
            } => format!(
                "{}  {}  {} rows\n",
                source,
                stage.as_str(),
                format_number(*rows)
            ),
        };
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl ProgressReporter for JsonProgress {
    fn report(&self, event: ProgressEvent) {
        let obj = match &event {
            ProgressEvent::Started { source, stage } => serde_json::json!({
                "event": "progress",
                "source": source,
                "stage": stage.as_str(),
            }),
            ProgressEvent::Rows {
                source,
                stage,
                rows,
            } => serde_json::json!({
                "event": "progress",
                "source": source,
                "stage": stage.as_str(),
                "rows": rows
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _event: ProgressEvent) {}
}

pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    let chars: Vec<char> = s.chars().rev().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    pub fn reporter(&self) -> Box<dyn ProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_number_comma() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(1), "1");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234), "1,234");
        assert_eq!(format_number(1_234_567), "1,234,567");
    }

    #[test]
    fn stage_names() {
        assert_eq!(Stage::Load.as_str(), "load");
        assert_eq!(Stage::Consolidate.as_str(), "consolidate");
    }
}
