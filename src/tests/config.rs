use super::Config;
use pretty_assertions::assert_eq;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_missing_file_gives_defaults() {
    let dir = TempDir::new().unwrap();
    let cfg = Config::load_from(&dir.path().join("sectree.toml")).unwrap();

    assert_eq!(cfg.wrap_width, 100);
    assert!(cfg.reorder_enabled);
    assert!(!cfg.preview);
    assert!(cfg.watch);
    assert_eq!(cfg.debounce(), Duration::from_millis(200));
    assert_eq!(cfg.wrapper_prefix, "layout-");
    assert_eq!(Config::non_empty(&cfg.journal_path), None);
    assert_eq!(Config::non_empty(&cfg.host_outbox), None);
    assert_eq!(Config::non_empty(&cfg.log_file), None);
}

#[test]
fn test_file_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sectree.toml");
    std::fs::write(
        &path,
        "wrap_width = 72\npreview = true\ndebounce_ms = 50\njournal_path = \"edits.ndjson\"\n",
    )
    .unwrap();

    let cfg = Config::load_from(&path).unwrap();

    assert_eq!(cfg.wrap_width, 72);
    assert!(cfg.preview);
    assert!(cfg.reorder_enabled);
    assert_eq!(cfg.debounce(), Duration::from_millis(50));
    assert_eq!(
        Config::non_empty(&cfg.journal_path),
        Some(Path::new("edits.ndjson"))
    );
}

#[test]
fn test_invalid_file_is_a_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sectree.toml");
    std::fs::write(&path, "wrap_width = \"wide\"\n").unwrap();

    assert!(matches!(
        Config::load_from(&path),
        Err(crate::error::Error::Config(_))
    ));
}
