// CLI surface tests

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

struct TestSetup {
    _temp_dir: TempDir,
    config_path: std::path::PathBuf,
    store_dir: std::path::PathBuf,
}

fn setup(store_name: &str, files: &[&str]) -> TestSetup {
    let temp_dir = TempDir::new().unwrap();
    let store_dir = temp_dir.path().join("store");
    let log_dir = temp_dir.path().join("logs");
    fs::create_dir_all(&store_dir).unwrap();

    for file in files {
        fs::write(store_dir.join(file), b"backup").unwrap();
    }

    let config_path = temp_dir.path().join("config.toml");
    let config_content = format!(
        r#"
[global]
log_directory = "{}"

[stores.{}]
root = "{}"
"#,
        log_dir.display(),
        store_name,
        store_dir.display()
    );
    fs::write(&config_path, config_content).unwrap();

    TestSetup {
        _temp_dir: temp_dir,
        config_path,
        store_dir,
    }
}

fn cmd() -> Command {
    Command::cargo_bin("backup-sweeper").unwrap()
}

#[test]
fn test_help_runs() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("retention"));
}

#[test]
fn test_validate_accepts_valid_config() {
    let setup = setup("cli-validate", &[]);

    cmd()
        .args(["--config", setup.config_path.to_str().unwrap(), "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"));
}

#[test]
fn test_validate_rejects_missing_config() {
    cmd()
        .args(["--config", "/nonexistent/config.toml", "validate"])
        .assert()
        .failure();
}

#[test]
fn test_plan_reports_keep_and_delete() {
    let setup = setup(
        "cli-plan",
        &[
            // Same old day twice: one keep, one delete regardless of when
            // the test runs (both are far in the past).
            "db_2020-01-10_02-00-00.sql.gz",
            "db_2020-01-10_04-00-00.sql.gz",
        ],
    );

    cmd()
        .args(["--config", setup.config_path.to_str().unwrap(), "plan"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[KEEP]"))
        .stdout(predicate::str::contains("[DELETE]"))
        .stdout(predicate::str::contains("Will delete: 1"));
}

#[test]
fn test_plan_json_is_parseable() {
    let setup = setup("cli-plan-json", &["db_2020-01-10_02-00-00.sql.gz"]);

    let output = cmd()
        .args([
            "--config",
            setup.config_path.to_str().unwrap(),
            "plan",
            "--json",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let plan: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(plan["store"], "cli-plan-json");
    assert!(plan["keep"].is_array());
    assert!(plan["delete"].is_array());
}

#[test]
fn test_sweep_with_yes_deletes_duplicates() {
    let setup = setup(
        "cli-sweep-yes",
        &[
            "db_2020-01-10_02-00-00.sql.gz",
            "db_2020-01-10_04-00-00.sql.gz",
        ],
    );

    cmd()
        .args([
            "--config",
            setup.config_path.to_str().unwrap(),
            "sweep",
            "--yes",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Successfully deleted 1/1"));

    // Newest of the day survives.
    assert!(setup.store_dir.join("db_2020-01-10_04-00-00.sql.gz").exists());
    assert!(!setup.store_dir.join("db_2020-01-10_02-00-00.sql.gz").exists());
}

#[test]
fn test_sweep_empty_store_prints_nothing_to_do() {
    let setup = setup("cli-sweep-empty", &[]);

    cmd()
        .args([
            "--config",
            setup.config_path.to_str().unwrap(),
            "sweep",
            "--yes",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("No backups found"));
}

#[test]
fn test_sweep_unknown_store_fails() {
    let setup = setup("cli-sweep-unknown", &[]);

    cmd()
        .args([
            "--config",
            setup.config_path.to_str().unwrap(),
            "sweep",
            "--store",
            "missing",
            "--yes",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing"));
}

#[test]
fn test_list_flags_keys_without_timestamp() {
    let setup = setup(
        "cli-list",
        &["db_2020-01-10_02-00-00.sql.gz", "README.md"],
    );

    cmd()
        .args(["--config", setup.config_path.to_str().unwrap(), "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("README.md (no timestamp)"));
}
