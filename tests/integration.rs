mod common;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

use common::{write_posts, AI_POSTS, UNIX_POSTS};

fn stackdump_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_stackdump"))
}

/// Base directory with already-extracted posts for `unix` and `ai`, and a
/// config that reuses them instead of running 7-Zip.
fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();

    let data_dir = root.join("data");
    fs::create_dir_all(&data_dir).unwrap();
    write_posts(&data_dir, "unix", UNIX_POSTS);
    write_posts(&data_dir, "ai", AI_POSTS);

    let config_content = r#"[pipeline]
sources = ["unix", "ai"]

[extract]
skip_existing = true

[logging]
level = "warn"
"#;
    let config_path = root.join("stackdump.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_stackdump(config_path: Option<&Path>, args: &[&str]) -> (String, String, bool) {
    let binary = stackdump_binary();
    let mut command = Command::new(&binary);
    if let Some(path) = config_path {
        command.arg("--config").arg(path);
    }
    let output = command
        .arg("--progress")
        .arg("off")
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run stackdump binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_sources_lists_registry() {
    let (stdout, stderr, success) = run_stackdump(None, &["sources"]);
    assert!(success, "sources failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("https://unix.stackexchange.com"));
    assert!(stdout.contains("http://datascience.stackexchange.com"));
    // Header plus one line per registered source
    assert_eq!(stdout.lines().count(), 24);
    assert!(stdout.lines().nth(1).unwrap().starts_with("ai "));
}

#[test]
fn test_sources_reports_directory_status() {
    let (tmp, config_path) = setup_test_env();
    let data_dir = tmp.path().join("data");

    let (stdout, stderr, success) = run_stackdump(
        Some(&config_path),
        &["sources", "--base", path_arg(&data_dir)],
    );
    assert!(success, "sources failed: stdout={}, stderr={}", stdout, stderr);

    let unix = stdout.lines().find(|l| l.starts_with("unix ")).unwrap();
    assert!(unix.contains("EXTRACTED"), "unexpected status: {}", unix);
    let dba = stdout.lines().find(|l| l.starts_with("dba ")).unwrap();
    assert!(dba.contains("MISSING"), "unexpected status: {}", dba);
}

#[test]
fn test_build_missing_base_fails() {
    let (tmp, config_path) = setup_test_env();
    let missing = tmp.path().join("nope");

    let (_, stderr, success) = run_stackdump(Some(&config_path), &["build", path_arg(&missing)]);
    assert!(!success, "build should fail on a missing directory");
    assert!(stderr.contains("does not exist"), "stderr: {}", stderr);
}

#[test]
fn test_build_and_stats() {
    let (tmp, config_path) = setup_test_env();
    let data_dir = tmp.path().join("data");

    let (stdout, stderr, success) =
        run_stackdump(Some(&config_path), &["build", path_arg(&data_dir)]);
    assert!(success, "build failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("consolidated: 3 rows (0 skipped)"), "stdout: {}", stdout);
    assert!(stdout.trim_end().ends_with("ok"));
    assert!(data_dir.join("questions.db").is_file());
    assert!(data_dir.join("unix").join("unix.db").is_file());
    assert!(data_dir.join("ai").join("Filtered.xml").is_file());

    let db = data_dir.join("questions.db");
    let (stdout, stderr, success) = run_stackdump(Some(&config_path), &["stats", path_arg(&db)]);
    assert!(success, "stats failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Questions:   3"));
    assert!(stdout.contains("Indexed:     3 / 3"));

    // Registry order puts ai before unix
    let ai = stdout.find("  ai ").unwrap();
    let unix = stdout.find("  unix ").unwrap();
    assert!(ai < unix);
}

#[test]
fn test_stats_missing_database_fails() {
    let tmp = TempDir::new().unwrap();
    let db = tmp.path().join("questions.db");

    let (_, stderr, success) = run_stackdump(None, &["stats", path_arg(&db)]);
    assert!(!success);
    assert!(stderr.contains("does not exist"), "stderr: {}", stderr);
}

#[test]
fn test_individual_stages() {
    let (tmp, _config_path) = setup_test_env();
    let unix_dir = tmp.path().join("data").join("unix");
    let posts = unix_dir.join("Posts.xml");
    let filtered = unix_dir.join("Filtered.xml");
    let staging = unix_dir.join("unix.db");
    let output = tmp.path().join("out").join("questions.db");

    let (stdout, stderr, success) =
        run_stackdump(None, &["sift", path_arg(&posts), path_arg(&filtered)]);
    assert!(success, "sift failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("questions kept: 2"));
    assert!(stdout.contains("answers kept: 2"));

    let (stdout, stderr, success) =
        run_stackdump(None, &["load", path_arg(&filtered), path_arg(&staging)]);
    assert!(success, "load failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("questions: 2"));
    assert!(stdout.contains("answers: 2"));

    let (stdout, stderr, success) = run_stackdump(
        None,
        &["consolidate", path_arg(&output), path_arg(&staging)],
    );
    assert!(success, "consolidate failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("unix: 2 rows"));
    assert!(stdout.contains("total rows: 2"));
    assert!(output.is_file());
}

#[test]
fn test_sift_min_score_override() {
    let (tmp, _config_path) = setup_test_env();
    let unix_dir = tmp.path().join("data").join("unix");
    let posts = unix_dir.join("Posts.xml");
    let filtered = unix_dir.join("Filtered.xml");

    let (stdout, stderr, success) = run_stackdump(
        None,
        &["sift", path_arg(&posts), path_arg(&filtered), "--min-score", "5"],
    );
    assert!(success, "sift failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("questions kept: 3"));
    assert!(stdout.contains("answers kept: 3"));
}

#[test]
fn test_consolidate_unknown_source_fails() {
    let tmp = TempDir::new().unwrap();
    let staging = tmp.path().join("cooking.db");
    fs::write(&staging, b"").unwrap();
    let output = tmp.path().join("questions.db");

    let (_, stderr, success) = run_stackdump(
        None,
        &["consolidate", path_arg(&output), path_arg(&staging)],
    );
    assert!(!success);
    assert!(stderr.contains("Unknown source 'cooking'"), "stderr: {}", stderr);
    assert!(!output.exists());
}

#[test]
fn test_invalid_config_rejected() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("bad.toml");
    fs::write(&config_path, "[pipeline]\nsources = [\"cooking\"]\n").unwrap();

    let (_, stderr, success) = run_stackdump(Some(&config_path), &["sources"]);
    assert!(!success);
    assert!(stderr.contains("cooking"), "stderr: {}", stderr);
}
