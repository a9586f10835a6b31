//! # stackdump
//!
//! Builds a single, full-text searchable SQLite database of question and
//! accepted-answer pairs from Stack Exchange data dumps.
//!
//! ## Architecture
//!
//! ```text
//!  per source, in registry order                         once
//! ┌──────────┐   ┌──────────┐   ┌──────────┐      ┌──────────────┐
//! │ Extract  │──▶│   Sift   │──▶│   Load   │─ ─ ─▶│ Consolidate  │
//! │ *.7z     │   │ Posts.xml│   │ staging  │      │ questions.db │
//! │          │   │ filtered │   │ <src>.db │      │ + FTS5       │
//! └──────────┘   └──────────┘   └──────────┘      └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! stackdump sources --base ./data     # check what each source directory holds
//! stackdump build ./data              # extract, sift, load, consolidate
//! stackdump stats ./data/questions.db
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`sources`] | Source registry and base URLs |
//! | [`extract`] | Archive extraction seam and 7-Zip implementation |
//! | [`sift`] | Single-pass filter over raw posts |
//! | [`load`] | Streaming XML load into staging databases |
//! | [`schema`] | Table descriptors and value coercion |
//! | [`consolidate`] | Staging → consolidated database with FTS5 |
//! | [`pipeline`] | Build orchestration |
//! | [`progress`] | Progress reporting on stderr |
//! | [`stats`] | Consolidated database summary |
//! | [`db`] | Database connections |

pub mod config;
pub mod consolidate;
pub mod db;
pub mod extract;
pub mod load;
pub mod models;
pub mod pipeline;
pub mod progress;
pub mod schema;
pub mod sift;
pub mod sources;
pub mod stats;
