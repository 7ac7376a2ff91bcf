use super::{parse_sections, run_load, FileLoader, LoaderEvent, Shared, WatchOptions};
use crate::node::Node;
use crate::store::SectionUpdate;
use pretty_assertions::assert_eq;
use std::sync::atomic::Ordering;
use std::sync::mpsc;
use std::time::Duration;
use tempfile::TempDir;

const DOCUMENT: &str = r#"[
    {"tag": "Layout", "key": "layout-a", "children": [{"tag": "Section", "id": "a"}]},
    {"tag": "Section", "id": "b"}
]"#;

fn expected() -> Vec<Node> {
    vec![
        Node::element("Layout")
            .with_key("layout-a")
            .with_child(Node::element("Section").with_id("a")),
        Node::element("Section").with_id("b"),
    ]
}

fn no_watch() -> WatchOptions {
    WatchOptions {
        enabled: false,
        debounce: Duration::from_millis(50),
    }
}

fn write_document(dir: &TempDir, contents: &str) -> FileLoader {
    let path = dir.path().join("sections.json");
    std::fs::write(&path, contents).unwrap();
    FileLoader::new(path)
}

#[test]
fn test_parse_bare_list() {
    assert_eq!(parse_sections(DOCUMENT).unwrap(), expected());
}

#[test]
fn test_parse_wrapped_document() {
    let wrapped = format!(r#"{{"sections": {DOCUMENT}}}"#);
    assert_eq!(parse_sections(&wrapped).unwrap(), expected());
}

#[test]
fn test_parse_rejects_other_shapes() {
    assert!(parse_sections(r#"{"nodes": []}"#).is_err());
    assert!(parse_sections("not json").is_err());
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let loader = FileLoader::new(dir.path().join("absent.json"));

    let err = loader.load().unwrap_err();
    assert!(err.to_string().contains("absent.json"));
}

#[test]
fn test_run_load_reports_loaded() {
    let dir = TempDir::new().unwrap();
    let loader = write_document(&dir, DOCUMENT);
    let (tx, rx) = mpsc::channel();
    let shared = Shared::default();

    run_load(&loader, no_watch(), &tx, &shared);

    assert_eq!(
        rx.try_recv().unwrap(),
        LoaderEvent::Loaded(SectionUpdate {
            generation: 0,
            sections: expected(),
        })
    );
    assert!(shared.watcher.lock().unwrap().is_none());
}

#[test]
fn test_run_load_reports_failure() {
    let dir = TempDir::new().unwrap();
    let loader = write_document(&dir, "{ broken");
    let (tx, rx) = mpsc::channel();

    run_load(&loader, no_watch(), &tx, &Shared::default());

    assert!(matches!(rx.try_recv().unwrap(), LoaderEvent::Failed(_)));
}

#[test]
fn test_teardown_before_completion_discards_result() {
    let dir = TempDir::new().unwrap();
    let loader = write_document(&dir, DOCUMENT);
    let (tx, rx) = mpsc::channel();
    let shared = Shared::default();
    shared.cancelled.store(true, Ordering::SeqCst);

    let watch = WatchOptions {
        enabled: true,
        ..no_watch()
    };
    run_load(&loader, watch, &tx, &shared);

    assert!(rx.try_recv().is_err());
    assert!(shared.watcher.lock().unwrap().is_none());
}

#[test]
fn test_generations_increase() {
    let shared = Shared::default();
    let first = shared.next_generation();
    let second = shared.next_generation();
    assert!(second > first);
}

#[test]
fn test_spawned_load_delivers_sections() {
    let dir = TempDir::new().unwrap();
    let loader = write_document(&dir, DOCUMENT);
    let (tx, rx) = mpsc::channel();

    let handle = super::LoadHandle::spawn(loader, no_watch(), tx);
    let event = rx.recv_timeout(Duration::from_secs(5)).unwrap();

    assert!(matches!(event, LoaderEvent::Loaded(update) if update.sections == expected()));
    handle.teardown();
    assert!(!handle.is_watching());
}
