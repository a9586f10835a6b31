//! End-to-end build orchestration.
//!
//! For each selected source, in registry order: extract the dump, sift the
//! posts, load the filtered stream into `<source>/<source>.db`. Then all
//! staging databases are consolidated into the output database in the base
//! directory. Any failure stops the run; there is no partial result.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::Config;
use crate::consolidate::{self, ConsolidateStats};
use crate::extract::Extractor;
use crate::load::{self, LoadOptions, LoadStats};
use crate::progress::{ProgressEvent, ProgressReporter, Stage};
use crate::sift::{self, SiftStats};
use crate::sources::Source;

/// What happened to one source.
#[derive(Debug, Clone)]
pub struct SourceReport {
    pub source: &'static str,
    pub database: PathBuf,
    pub sift: SiftStats,
    pub load: LoadStats,
}

/// Result of a full build.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub sources: Vec<SourceReport>,
    pub output: PathBuf,
    pub consolidate: ConsolidateStats,
}

pub struct Pipeline<'a> {
    config: &'a Config,
    extractor: &'a dyn Extractor,
    progress: &'a dyn ProgressReporter,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: &'a Config,
        extractor: &'a dyn Extractor,
        progress: &'a dyn ProgressReporter,
    ) -> Self {
        Self {
            config,
            extractor,
            progress,
        }
    }

    /// Build the consolidated database for every selected source under `base`.
    pub async fn run(&self, base: &Path) -> Result<PipelineReport> {
        if !base.is_dir() {
            bail!("Data directory does not exist: {}", base.display());
        }

        let selected = self.config.pipeline.selected_sources();
        info!(base = %base.display(), sources = selected.len(), "starting build");

        let mut sources = Vec::with_capacity(selected.len());
        for source in selected {
            sources.push(self.process(base, source).await?);
        }

        let databases: Vec<PathBuf> = sources.iter().map(|s| s.database.clone()).collect();
        let output = base.join(&self.config.pipeline.output_file);
        let consolidate = consolidate::consolidate(&databases, &output, self.progress).await?;

        info!(rows = consolidate.rows, output = %output.display(), "build complete");
        Ok(PipelineReport {
            sources,
            output,
            consolidate,
        })
    }

    async fn process(&self, base: &Path, source: &'static Source) -> Result<SourceReport> {
        let dir = base.join(source.key);
        let pipeline = &self.config.pipeline;

        self.started(source, Stage::Extract);
        let posts = self
            .extractor
            .extract(&dir)
            .with_context(|| format!("Failed to extract {}", dir.display()))?;

        self.started(source, Stage::Sift);
        let filtered = dir.join(&pipeline.filtered_file);
        let sift = sift::sift(&posts, &filtered, self.config.sift.min_score)?;

        self.started(source, Stage::Load);
        let database = dir.join(format!("{}.db", source.key));
        let options = LoadOptions {
            source: source.key,
            progress_every: self.config.load.progress_every,
            progress: self.progress,
        };
        let load = load::load(&filtered, &database, &options).await?;

        Ok(SourceReport {
            source: source.key,
            database,
            sift,
            load,
        })
    }

    fn started(&self, source: &Source, stage: Stage) {
        self.progress.report(ProgressEvent::Started {
            source: source.key.to_string(),
            stage,
        });
    }
}
