//! Archive extraction.
//!
//! The pipeline only needs "given a source directory, leave the posts file
//! in it". [`Extractor`] is that seam; [`SevenZip`] fulfils it by running
//! the external `7za`/`7z` tool against the dump archives in the directory.

use globset::{Glob, GlobMatcher};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

use crate::config::Config;

/// Extraction error. All variants are fatal for the source being processed.
#[derive(Debug)]
pub enum ExtractError {
    /// No archive matching the configured pattern in the directory.
    NoArchive(PathBuf),
    /// The tool ran but the posts file was not produced.
    MissingMember { dir: PathBuf, member: String },
    /// None of the configured binaries could be started.
    ToolUnavailable(String),
    /// The tool exited unsuccessfully.
    Failed {
        tool: String,
        status: Option<i32>,
        output: String,
    },
    Pattern(String),
    Io(io::Error),
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractError::NoArchive(dir) => {
                write!(f, "no archive found in {}", dir.display())
            }
            ExtractError::MissingMember { dir, member } => {
                write!(f, "{} was not extracted into {}", member, dir.display())
            }
            ExtractError::ToolUnavailable(tools) => {
                write!(f, "extraction tool not found (tried: {})", tools)
            }
            ExtractError::Failed {
                tool,
                status,
                output,
            } => {
                let status = status
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string());
                write!(f, "{} exited with status {}:\n{}", tool, status, output)
            }
            ExtractError::Pattern(e) => write!(f, "invalid archive pattern: {}", e),
            ExtractError::Io(e) => write!(f, "extraction I/O error: {}", e),
        }
    }
}

impl std::error::Error for ExtractError {}

impl From<io::Error> for ExtractError {
    fn from(e: io::Error) -> Self {
        ExtractError::Io(e)
    }
}

/// Produces the flat posts file for one source directory.
pub trait Extractor {
    /// Extract into `dir` and return the path of the posts file.
    fn extract(&self, dir: &Path) -> Result<PathBuf, ExtractError>;
}

/// Runs `7za e <archive> <member> -y -o<dir>` for each archive in the directory.
pub struct SevenZip {
    binaries: Vec<String>,
    archives: GlobMatcher,
    member: String,
    skip_existing: bool,
}

impl SevenZip {
    pub fn new(
        binaries: Vec<String>,
        archive_glob: &str,
        member: impl Into<String>,
        skip_existing: bool,
    ) -> Result<Self, ExtractError> {
        Ok(Self {
            binaries,
            archives: archive_matcher(archive_glob)?,
            member: member.into(),
            skip_existing,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ExtractError> {
        Self::new(
            config.extract.binaries.clone(),
            &config.extract.archive_glob,
            config.pipeline.posts_file.clone(),
            config.extract.skip_existing,
        )
    }

    fn run_tool(&self, archive: &Path, dir: &Path) -> Result<(), ExtractError> {
        for binary in &self.binaries {
            let result = Command::new(binary)
                .arg("e")
                .arg(archive)
                .arg(&self.member)
                .arg("-y")
                .arg(format!("-o{}", dir.display()))
                .output();

            let output = match result {
                Ok(output) => output,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(ExtractError::Io(e)),
            };

            let mut text = String::from_utf8_lossy(&output.stdout).to_string();
            text.push_str(&String::from_utf8_lossy(&output.stderr));
            for line in text.lines().filter(|l| !l.trim().is_empty()) {
                debug!(tool = %binary, "{}", line.trim());
            }

            if !output.status.success() {
                return Err(ExtractError::Failed {
                    tool: binary.clone(),
                    status: output.status.code(),
                    output: text,
                });
            }
            return Ok(());
        }

        Err(ExtractError::ToolUnavailable(self.binaries.join(", ")))
    }
}

impl Extractor for SevenZip {
    fn extract(&self, dir: &Path) -> Result<PathBuf, ExtractError> {
        let target = dir.join(&self.member);
        if self.skip_existing && target.is_file() {
            info!(path = %target.display(), "reusing extracted posts file");
            return Ok(target);
        }

        let archives = find_archives(dir, &self.archives)?;
        if archives.is_empty() {
            return Err(ExtractError::NoArchive(dir.to_path_buf()));
        }

        // A leftover posts file must not stand in for a failed extraction
        if target.exists() {
            std::fs::remove_file(&target)?;
        }

        for archive in &archives {
            info!(archive = %archive.display(), "extracting {}", self.member);
            self.run_tool(archive, dir)?;
        }

        if !target.is_file() {
            return Err(ExtractError::MissingMember {
                dir: dir.to_path_buf(),
                member: self.member.clone(),
            });
        }
        Ok(target)
    }
}

pub fn archive_matcher(pattern: &str) -> Result<GlobMatcher, ExtractError> {
    Glob::new(pattern)
        .map(|g| g.compile_matcher())
        .map_err(|e| ExtractError::Pattern(e.to_string()))
}

/// Archives directly inside `dir` whose file name matches, sorted by name.
pub fn find_archives(dir: &Path, matcher: &GlobMatcher) -> Result<Vec<PathBuf>, ExtractError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut archives = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if matcher.is_match(entry.file_name()) {
            archives.push(entry.path());
        }
    }
    archives.sort();
    Ok(archives)
}
