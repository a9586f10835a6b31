//! # stackdump CLI
//!
//! ## Usage
//!
//! ```bash
//! stackdump [--config ./stackdump.toml] <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `stackdump build <base>` | Run the whole pipeline over `<base>/<source>/` directories |
//! | `stackdump sift <in> <out>` | Filter one raw posts file |
//! | `stackdump load <in> <db>` | Load one filtered file into a staging database |
//! | `stackdump consolidate <out> <db>...` | Merge staging databases |
//! | `stackdump sources` | List registered sources |
//! | `stackdump stats <db>` | Summarize a consolidated database |

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use stackdump::config::{self, Config, LogFormat, LoggingConfig};
use stackdump::consolidate;
use stackdump::extract::SevenZip;
use stackdump::load::{self, LoadOptions};
use stackdump::pipeline::Pipeline;
use stackdump::progress::{format_number, ProgressMode};
use stackdump::sift;
use stackdump::sources;
use stackdump::stats;

/// Build a consolidated, searchable question/answer database from
/// Stack Exchange data dumps.
#[derive(Parser)]
#[command(name = "stackdump", version)]
struct Cli {
    /// Path to a TOML configuration file. Built-in defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Progress output on stderr. Defaults to `human` on a terminal, `off` otherwise.
    #[arg(long, global = true, value_enum)]
    progress: Option<ProgressMode>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline.
    ///
    /// Every selected source is read from `<base>/<source>/`: its archive is
    /// extracted, the posts are sifted and loaded into `<source>.db`, and all
    /// staging databases are consolidated into `<base>/questions.db`.
    Build {
        /// Base directory holding one subdirectory per source.
        base: PathBuf,
    },

    /// Filter a raw posts file down to accepted question/answer pairs.
    Sift {
        input: PathBuf,
        output: PathBuf,

        /// Minimum question score. Overrides `sift.min_score`.
        #[arg(long)]
        min_score: Option<i64>,
    },

    /// Load a filtered posts file into a fresh staging database.
    Load { input: PathBuf, database: PathBuf },

    /// Merge staging databases, in the given order, into one questions database.
    ///
    /// Each staging database's file stem must be a registered source key.
    Consolidate {
        output: PathBuf,
        #[arg(required = true)]
        databases: Vec<PathBuf>,
    },

    /// List registered sources and their base URLs.
    Sources {
        /// Also report the state of each `<base>/<source>` directory.
        #[arg(long)]
        base: Option<PathBuf>,
    },

    /// Summarize a consolidated questions database.
    Stats { database: PathBuf },
}

fn init_tracing(logging: &LoggingConfig, verbose: u8) {
    let level = match verbose {
        0 => logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match logging.format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => Config::default(),
    };
    init_tracing(&cfg.logging, cli.verbose);

    let progress = cli
        .progress
        .unwrap_or_else(ProgressMode::default_for_tty)
        .reporter();

    match cli.command {
        Commands::Build { base } => {
            let extractor = SevenZip::from_config(&cfg)?;
            let report = Pipeline::new(&cfg, &extractor, progress.as_ref())
                .run(&base)
                .await?;

            println!("build {}", base.display());
            for source in &report.sources {
                println!(
                    "  {:<20} sift: {} questions, {} answers   load: {} rows",
                    source.source,
                    format_number(source.sift.questions),
                    format_number(source.sift.answers),
                    format_number(source.load.total())
                );
            }
            println!(
                "  consolidated: {} rows ({} skipped)",
                format_number(report.consolidate.rows),
                format_number(report.consolidate.skipped)
            );
            println!("  output: {}", report.output.display());
            println!("ok");
        }
        Commands::Sift {
            input,
            output,
            min_score,
        } => {
            let min_score = min_score.unwrap_or(cfg.sift.min_score);
            let stats = sift::sift(&input, &output, min_score)?;
            println!("sift {}", input.display());
            println!("  lines read: {}", stats.lines);
            println!("  questions kept: {}", stats.questions);
            println!("  answers kept: {}", stats.answers);
            println!("  unresolved answers: {}", stats.unresolved);
        }
        Commands::Load { input, database } => {
            let source = consolidate::source_key(&database).unwrap_or_default();
            let options = LoadOptions {
                source: &source,
                progress_every: cfg.load.progress_every,
                progress: progress.as_ref(),
            };
            let stats = load::load(&input, &database, &options).await?;
            println!("load {}", input.display());
            println!("  questions: {}", stats.questions);
            println!("  answers: {}", stats.answers);
        }
        Commands::Consolidate { output, databases } => {
            let stats = consolidate::consolidate(&databases, &output, progress.as_ref()).await?;
            println!("consolidate {}", output.display());
            for (source, rows) in &stats.per_source {
                println!("  {}: {} rows", source, rows);
            }
            println!("  total rows: {}", stats.rows);
            println!("  skipped: {}", stats.skipped);
        }
        Commands::Sources { base } => {
            sources::list_sources(&cfg, base.as_deref())?;
        }
        Commands::Stats { database } => {
            stats::run_stats(&database).await?;
        }
    }

    Ok(())
}
