//! Registry of Stack Exchange sources.
//!
//! Each source is one community dump living in `<base>/<key>/`. The registry
//! order is the processing order, and therefore the order in which global ids
//! are handed out during consolidation.

use anyhow::Result;
use globset::GlobMatcher;
use std::path::Path;

use crate::config::Config;
use crate::extract;

/// One registered community: its directory/database key and site base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Source {
    pub key: &'static str,
    pub base_url: &'static str,
}

impl Source {
    /// Canonical link to a question on this source's site.
    pub fn reference(&self, source_id: i64) -> String {
        format!("{}/questions/{}", self.base_url, source_id)
    }
}

const fn source(key: &'static str, base_url: &'static str) -> Source {
    Source { key, base_url }
}

/// All known sources, in processing order.
pub static SOURCES: &[Source] = &[
    source("ai", "https://ai.stackexchange.com"),
    source("android", "https://android.stackexchange.com"),
    source("apple", "https://apple.stackexchange.com"),
    source("arduino", "https://arduino.stackexchange.com"),
    source("askubuntu", "https://askubuntu.com"),
    source("avp", "https://avp.stackexchange.com"),
    source("codereview", "https://codereview.stackexchange.com"),
    source("cs", "https://cs.stackexchange.com"),
    source("datascience", "http://datascience.stackexchange.com"),
    source("dba", "https://dba.stackexchange.com"),
    source("devops", "https://devops.stackexchange.com"),
    source("dsp", "https://dsp.stackexchange.com"),
    source("raspberrypi", "https://raspberrypi.stackexchange.com"),
    source(
        "reverseengineering",
        "https://reverseengineering.stackexchange.com",
    ),
    source("scicomp", "https://scicomp.stackexchange.com"),
    source("serverfault", "https://serverfault.com"),
    source("security", "https://security.stackexchange.com"),
    source("stackoverflow", "https://stackoverflow.com"),
    source("stats", "https://stats.stackexchange.com"),
    source("superuser", "https://superuser.com"),
    source("unix", "https://unix.stackexchange.com"),
    source("vi", "https://vi.stackexchange.com"),
    source("wordpress", "https://wordpress.stackexchange.com"),
];

/// Look up a registered source by key.
pub fn find(key: &str) -> Option<&'static Source> {
    SOURCES.iter().find(|s| s.key == key)
}

/// Print the registry. With a base directory, also report what each
/// source directory currently holds.
pub fn list_sources(config: &Config, base: Option<&Path>) -> Result<()> {
    let archives = extract::archive_matcher(&config.extract.archive_glob)?;

    println!("{:<20} {:<44} STATUS", "SOURCE", "BASE URL");

    for source in SOURCES {
        let status = match base {
            Some(base) => directory_status(
                &base.join(source.key),
                &config.pipeline.posts_file,
                &archives,
            )?,
            None => "-",
        };
        println!("{:<20} {:<44} {}", source.key, source.base_url, status);
    }

    Ok(())
}

fn directory_status(dir: &Path, posts_file: &str, archives: &GlobMatcher) -> Result<&'static str> {
    if !dir.is_dir() {
        return Ok("MISSING");
    }
    if dir.join(posts_file).is_file() {
        return Ok("EXTRACTED");
    }
    if !extract::find_archives(dir, archives)?.is_empty() {
        return Ok("ARCHIVE");
    }
    Ok("EMPTY")
}
