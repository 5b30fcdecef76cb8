//! Tests for config module

use std::io::Write;
use std::path::PathBuf;

use reelsync::config::Config;
use serial_test::serial;
use tempfile::NamedTempFile;

const ENV_KEYS: &[&str] = &[
    "REELSYNC_BATCH_SIZE",
    "REELSYNC_SYNC_PERIOD_SECS",
    "REELSYNC_PERIODIC_LOOKAHEAD_SECS",
    "REELSYNC_IMMEDIATE_LOOKAHEAD_SECS",
    "REELSYNC_SQLITE_PATH",
    "REELSYNC_LISTING_PATH",
    "REELSYNC_LOG_LEVEL",
    "REELSYNC_LOG_FORMAT",
];

fn clear_env() {
    for key in ENV_KEYS {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_from_env_uses_defaults() {
    clear_env();
    let config = Config::from_env().unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.sync.batch_size, 100);
}

#[test]
#[serial]
fn test_from_env_overrides() {
    clear_env();
    std::env::set_var("REELSYNC_BATCH_SIZE", "25");
    std::env::set_var("REELSYNC_SQLITE_PATH", "/tmp/reelsync-test.db");
    std::env::set_var("REELSYNC_LOG_FORMAT", "json");

    let config = Config::from_env().unwrap();
    clear_env();

    assert_eq!(config.sync.batch_size, 25);
    assert_eq!(
        config.storage.sqlite_path,
        PathBuf::from("/tmp/reelsync-test.db")
    );
    assert_eq!(config.logging.format, "json");
}

#[test]
#[serial]
fn test_from_env_rejects_zero_batch_size() {
    clear_env();
    std::env::set_var("REELSYNC_BATCH_SIZE", "0");
    let result = Config::from_env();
    clear_env();

    assert!(result.is_err());
}

#[test]
#[serial]
fn test_unparseable_env_value_falls_back() {
    clear_env();
    std::env::set_var("REELSYNC_SYNC_PERIOD_SECS", "soon");
    let config = Config::from_env().unwrap();
    clear_env();

    assert_eq!(config.sync.period_secs, 12 * 60 * 60);
}

#[test]
fn test_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[sync]
batch_size = 50
period_secs = 600
periodic_lookahead_secs = 86400
immediate_lookahead_secs = 1800

[storage]
sqlite_path = "data/test.db"

[listing]
path = "fixtures/listing.json"

[logging]
level = "debug"
format = "text"
"#
    )
    .unwrap();

    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.sync.batch_size, 50);
    assert_eq!(config.sync_period().as_secs(), 600);
    assert_eq!(config.listing.path, PathBuf::from("fixtures/listing.json"));
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_from_file_rejects_invalid_values() {
    let mut file = NamedTempFile::new().unwrap();
    let mut text = toml::to_string(&Config::default()).unwrap();
    text = text.replace("format = \"text\"", "format = \"xml\"");
    file.write_all(text.as_bytes()).unwrap();

    assert!(Config::from_file(file.path()).is_err());
}

#[test]
fn test_missing_file_is_an_error() {
    assert!(Config::from_file(std::path::Path::new("/nonexistent/reelsync.toml")).is_err());
}
