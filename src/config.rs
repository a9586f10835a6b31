use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

use crate::sources::{self, Source, SOURCES};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub sift: SiftConfig,
    #[serde(default)]
    pub load: LoadConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PipelineConfig {
    /// Subset of registered sources to process. Empty means all of them.
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default = "default_posts_file")]
    pub posts_file: String,
    #[serde(default = "default_filtered_file")]
    pub filtered_file: String,
    #[serde(default = "default_output_file")]
    pub output_file: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            posts_file: default_posts_file(),
            filtered_file: default_filtered_file(),
            output_file: default_output_file(),
        }
    }
}

fn default_posts_file() -> String {
    "Posts.xml".to_string()
}
fn default_filtered_file() -> String {
    "Filtered.xml".to_string()
}
fn default_output_file() -> String {
    "questions.db".to_string()
}

impl PipelineConfig {
    /// Sources to process, always in registry order.
    pub fn selected_sources(&self) -> Vec<&'static Source> {
        SOURCES
            .iter()
            .filter(|s| self.sources.is_empty() || self.sources.iter().any(|k| k == s.key))
            .collect()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SiftConfig {
    #[serde(default = "default_min_score")]
    pub min_score: i64,
}

impl Default for SiftConfig {
    fn default() -> Self {
        Self {
            min_score: default_min_score(),
        }
    }
}

fn default_min_score() -> i64 {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoadConfig {
    #[serde(default = "default_progress_every")]
    pub progress_every: u64,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            progress_every: default_progress_every(),
        }
    }
}

fn default_progress_every() -> u64 {
    10_000
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExtractConfig {
    #[serde(default = "default_binaries")]
    pub binaries: Vec<String>,
    #[serde(default = "default_archive_glob")]
    pub archive_glob: String,
    /// Reuse an already extracted posts file instead of running the tool.
    #[serde(default)]
    pub skip_existing: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            binaries: default_binaries(),
            archive_glob: default_archive_glob(),
            skip_existing: false,
        }
    }
}

fn default_binaries() -> Vec<String> {
    vec!["7za".to_string(), "7z".to_string()]
}
fn default_archive_glob() -> String {
    "*.7z".to_string()
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: LogLevel,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}
fn default_log_format() -> LogFormat {
    LogFormat::Text
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;

    Ok(config)
}

pub fn validate(config: &Config) -> Result<()> {
    for key in &config.pipeline.sources {
        if sources::find(key).is_none() {
            anyhow::bail!("pipeline.sources: unknown source '{}'", key);
        }
    }

    for (name, value) in [
        ("pipeline.posts_file", &config.pipeline.posts_file),
        ("pipeline.filtered_file", &config.pipeline.filtered_file),
        ("pipeline.output_file", &config.pipeline.output_file),
    ] {
        if value.trim().is_empty() {
            anyhow::bail!("{} must not be empty", name);
        }
    }

    if config.load.progress_every == 0 {
        anyhow::bail!("load.progress_every must be > 0");
    }

    if config.extract.binaries.is_empty() {
        anyhow::bail!("extract.binaries must name at least one tool");
    }

    globset::Glob::new(&config.extract.archive_glob)
        .with_context(|| format!("Invalid extract.archive_glob: {}", config.extract.archive_glob))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<Config> {
        let config: Config = toml::from_str(content)?;
        validate(&config)?;
        Ok(config)
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config.sift.min_score, 10);
        assert_eq!(config.load.progress_every, 10_000);
        assert_eq!(config.pipeline.posts_file, "Posts.xml");
        assert_eq!(config.pipeline.output_file, "questions.db");
        assert_eq!(config.extract.binaries, vec!["7za", "7z"]);
        assert_eq!(config.logging.level, LogLevel::Info);
        assert_eq!(config.pipeline.selected_sources().len(), SOURCES.len());
    }

    #[test]
    fn subset_keeps_registry_order() {
        let config = parse(
            r#"
            [pipeline]
            sources = ["unix", "ai"]
            "#,
        )
        .unwrap();
        let keys: Vec<&str> = config
            .pipeline
            .selected_sources()
            .iter()
            .map(|s| s.key)
            .collect();
        assert_eq!(keys, vec!["ai", "unix"]);
    }

    #[test]
    fn rejects_unknown_source() {
        let err = parse(
            r#"
            [pipeline]
            sources = ["cooking"]
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("cooking"));
    }

    #[test]
    fn rejects_zero_progress_interval() {
        assert!(parse("[load]\nprogress_every = 0\n").is_err());
    }

    #[test]
    fn rejects_empty_binaries() {
        assert!(parse("[extract]\nbinaries = []\n").is_err());
    }

    #[test]
    fn logging_section() {
        let config = parse("[logging]\nlevel = \"debug\"\nformat = \"json\"\n").unwrap();
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.format, LogFormat::Json);
    }
}
