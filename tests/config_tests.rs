// Integration tests for configuration loading and validation

use std::fs;
use tempfile::TempDir;

#[test]
fn test_valid_config_loads() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let config_content = format!(
        r#"
[global]
log_directory = "{}"

[stores.nightly]
root = "{}"
prefix = "db_"
description = "Nightly database dumps"
"#,
        temp_dir.path().display(),
        temp_dir.path().display()
    );

    fs::write(&config_path, config_content).unwrap();

    let config = backup_sweeper::config::load_config(&config_path).unwrap();
    let resolved = backup_sweeper::config::resolve_all_stores(&config);

    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved["nightly"].prefix, "db_");
    assert!(resolved["nightly"].enabled);
    // Global pattern is inherited when the store has no override.
    assert_eq!(
        resolved["nightly"].datetime_pattern,
        config.global.datetime_pattern
    );
}

#[test]
fn test_config_validation_no_stores() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    fs::write(&config_path, "[stores]\n").unwrap();

    let result = backup_sweeper::config::load_config(&config_path);
    assert!(result.is_err());
}

#[test]
fn test_config_validation_invalid_pattern() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let config_content = format!(
        r#"
[stores.nightly]
root = "{}"
datetime_pattern = "(unclosed"
"#,
        temp_dir.path().display()
    );

    fs::write(&config_path, config_content).unwrap();

    let result = backup_sweeper::config::load_config(&config_path);
    assert!(result.is_err());
}

#[test]
fn test_config_validation_nonexistent_root() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let config_content = r#"
[stores.nightly]
root = "/nonexistent/backups/nightly"
"#;

    fs::write(&config_path, config_content).unwrap();

    let result = backup_sweeper::config::load_config(&config_path);
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("root directory does not exist"));
}

#[test]
fn test_config_missing_file_is_an_error() {
    let result = backup_sweeper::config::load_config("/nonexistent/backup-sweeper.toml");
    assert!(result.is_err());
}

#[test]
fn test_store_pattern_override() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let config_content = format!(
        r#"
[stores.compact]
root = "{}"
datetime_pattern = '\d{{8}}'
"#,
        temp_dir.path().display()
    );

    fs::write(&config_path, config_content).unwrap();

    let config = backup_sweeper::config::load_config(&config_path).unwrap();
    let resolved = backup_sweeper::config::resolve_all_stores(&config);
    assert_eq!(resolved["compact"].datetime_pattern, r"\d{8}");
}

#[test]
fn test_disabled_store_keeps_flag() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let config_content = format!(
        r#"
[stores.old]
root = "{}"
enabled = false
"#,
        temp_dir.path().display()
    );

    fs::write(&config_path, config_content).unwrap();

    let config = backup_sweeper::config::load_config(&config_path).unwrap();
    let resolved = backup_sweeper::config::resolve_all_stores(&config);
    assert!(!resolved["old"].enabled);
}
