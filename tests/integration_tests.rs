//! Integration tests for the filesize-filter CLI

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const MB: u64 = 1024 * 1024;

/// Command isolated from the user's config and environment
fn filesize_filter(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("filesize-filter").unwrap();
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env_remove("RUST_LOG")
        .env_remove("FILESIZE_FILTER_ENABLED")
        .env_remove("FILESIZE_FILTER_MIN_FILE_SIZE_MB");
    cmd
}

/// Sparse media file of `len` bytes
fn media_file(path: &Path, len: u64) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::File::create(path).unwrap().set_len(len).unwrap();
}

fn json_stdout(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}

/// Library with one 1 MB sample and one 3 MB episode, already catalogued
fn scanned_library() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    media_file(&temp_dir.path().join("media/show/sample.mkv"), MB);
    media_file(&temp_dir.path().join("media/show/episode.mkv"), 3 * MB);
    fs::write(temp_dir.path().join("media/show/episode.nfo"), "meta").unwrap();

    filesize_filter(temp_dir.path())
        .args(["scan", "media", "--no-cleanup"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Catalog updated: 2 items"));

    temp_dir
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("filesize-filter").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("clean"))
        .stdout(predicate::str::contains("scan"));
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("filesize-filter").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("filesize-filter"));
}

#[test]
fn test_invalid_subcommand() {
    let mut cmd = Command::cargo_bin("filesize-filter").unwrap();
    cmd.arg("invalid-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_version_command() {
    let temp_dir = TempDir::new().unwrap();
    filesize_filter(temp_dir.path())
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "filesize-filter v{}",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_dry_run_json_reports_threshold() {
    let temp_dir = scanned_library();

    let report = json_stdout(filesize_filter(temp_dir.path()).args([
        "clean",
        "--min-size",
        "2",
        "--dry-run",
        "--format",
        "json",
    ]));
    assert_eq!(report["threshold_bytes"], 2 * MB);
    assert_eq!(report["matches"].as_array().unwrap().len(), 1);
}

#[test]
fn test_scan_writes_catalog() {
    let temp_dir = scanned_library();
    let index = temp_dir.path().join(".filesize-filter/library.json");
    assert!(index.exists());

    let catalog: Value = serde_json::from_str(&fs::read_to_string(index).unwrap()).unwrap();
    assert_eq!(catalog["version"], 1);
    assert_eq!(catalog["items"].as_array().unwrap().len(), 2);
}

#[test]
fn test_scan_without_root_fails() {
    let temp_dir = TempDir::new().unwrap();
    filesize_filter(temp_dir.path())
        .arg("scan")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No library root"));
}

#[test]
fn test_clean_removes_small_items_and_is_idempotent() {
    let temp_dir = scanned_library();

    let first = json_stdout(
        filesize_filter(temp_dir.path()).args(["clean", "--min-size", "2", "--format", "json"]),
    );
    assert_eq!(first["examined"], 2);
    assert_eq!(first["removed"], 1);
    assert_eq!(first["failed_to_remove"], 0);
    assert!(
        first["removed_items"][0]["path"]
            .as_str()
            .unwrap()
            .ends_with("sample.mkv")
    );

    // Catalog-only removal leaves the file on disk
    assert!(temp_dir.path().join("media/show/sample.mkv").exists());

    let second = json_stdout(
        filesize_filter(temp_dir.path()).args(["clean", "--min-size", "2", "--format", "json"]),
    );
    assert_eq!(second["examined"], 1);
    assert_eq!(second["marked_for_removal"], 0);
    assert_eq!(second["removed"], 0);
}

#[test]
fn test_clean_can_delete_files() {
    let temp_dir = scanned_library();

    filesize_filter(temp_dir.path())
        .args(["clean", "--min-size", "2", "--delete-files"])
        .assert()
        .success();

    assert!(!temp_dir.path().join("media/show/sample.mkv").exists());
    assert!(temp_dir.path().join("media/show/episode.mkv").exists());
}

#[test]
fn test_dry_run_changes_nothing() {
    let temp_dir = scanned_library();
    let index = temp_dir.path().join(".filesize-filter/library.json");
    let before = fs::read_to_string(&index).unwrap();

    filesize_filter(temp_dir.path())
        .args(["clean", "--min-size", "2", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sample.mkv"))
        .stdout(predicate::str::contains("Would remove"));

    assert_eq!(fs::read_to_string(&index).unwrap(), before);
}

#[test]
fn test_zero_threshold_removes_nothing() {
    let temp_dir = scanned_library();

    let report = json_stdout(
        filesize_filter(temp_dir.path()).args(["clean", "--min-size", "0", "--format", "json"]),
    );
    assert_eq!(report["examined"], 2);
    assert_eq!(report["removed"], 0);
}

#[test]
fn test_missing_file_is_skipped() {
    let temp_dir = scanned_library();
    fs::remove_file(temp_dir.path().join("media/show/sample.mkv")).unwrap();

    let report = json_stdout(
        filesize_filter(temp_dir.path()).args(["clean", "--min-size", "2", "--format", "json"]),
    );
    assert_eq!(report["examined"], 2);
    assert_eq!(report["skipped_missing"], 1);
    assert_eq!(report["removed"], 0);
}

#[test]
fn test_disabled_filter_skips_unless_forced() {
    let temp_dir = scanned_library();
    fs::write(temp_dir.path().join("filesize-filter.toml"), "enabled = false\n").unwrap();

    let skipped = json_stdout(
        filesize_filter(temp_dir.path()).args(["clean", "--min-size", "2", "--format", "json"]),
    );
    assert_eq!(skipped["enabled"], false);

    let forced = json_stdout(filesize_filter(temp_dir.path()).args([
        "clean",
        "--min-size",
        "2",
        "--force",
        "--format",
        "json",
    ]));
    assert_eq!(forced["removed"], 1);
}

#[test]
fn test_env_override_sets_threshold() {
    let temp_dir = scanned_library();

    let report = json_stdout(
        filesize_filter(temp_dir.path())
            .env("FILESIZE_FILTER_MIN_FILE_SIZE_MB", "4")
            .args(["clean", "--format", "json"]),
    );
    assert_eq!(report["removed"], 2);
}

#[test]
fn test_list_shows_sizes_and_missing_files() {
    let temp_dir = scanned_library();
    fs::remove_file(temp_dir.path().join("media/show/episode.mkv")).unwrap();

    filesize_filter(temp_dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 MiB"))
        .stdout(predicate::str::contains("missing"));
}

#[test]
fn test_custom_index_path() {
    let temp_dir = TempDir::new().unwrap();
    media_file(&temp_dir.path().join("media/a.mp3"), 10);

    filesize_filter(temp_dir.path())
        .args(["--index", "catalog.json", "scan", "media"])
        .assert()
        .success();

    let catalog: Value =
        serde_json::from_str(&fs::read_to_string(temp_dir.path().join("catalog.json")).unwrap())
            .unwrap();
    // The post-scan cleanup removed the tiny file again
    assert_eq!(catalog["items"].as_array().unwrap().len(), 0);
}

#[test]
fn test_config_show_and_validate() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("filesize-filter.toml"), "min_file_size_mb = 250\n").unwrap();

    filesize_filter(temp_dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("min_file_size_mb = 250"));

    filesize_filter(temp_dir.path())
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"));
}

#[test]
fn test_missing_custom_config_fails() {
    let temp_dir = TempDir::new().unwrap();
    filesize_filter(temp_dir.path())
        .args(["--config", "nope.toml", "config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));
}
