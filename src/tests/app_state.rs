use super::{AppState, LoadStatus, MoveState, View};
use crate::context::Dispatcher;
use crate::host::HostMessage;
use crate::journal::{EditRecord, MemoryJournal};
use crate::loader::LoaderEvent;
use crate::node::Node;
use crate::render::{RenderOptions, Renderer};
use crate::store::{SectionStore, SectionUpdate};
use crate::traversal::find_by_id;
use pretty_assertions::assert_eq;
use std::sync::mpsc;

const REORDER: RenderOptions = RenderOptions {
    reorder_enabled: true,
    is_preview: false,
};

fn wrapped(id: &str, text: &str) -> Node {
    Node::element("Layout").with_key(format!("layout-{id}")).with_child(
        Node::element("Section")
            .with_id(id)
            .with_child(Node::text(text)),
    )
}

fn document() -> Vec<Node> {
    vec![
        wrapped("a", "Alpha"),
        wrapped("b", "Beta"),
        Node::element("Section")
            .with_id("c")
            .with_child(Node::text("Gamma")),
    ]
}

struct Harness {
    app: AppState,
    host: mpsc::Receiver<HostMessage>,
    journal: MemoryJournal,
}

fn harness(options: RenderOptions) -> Harness {
    let (action_tx, action_rx) = mpsc::channel();
    let dispatcher = Dispatcher::from_sender(action_tx);
    let (host_tx, host) = mpsc::channel();
    let journal = MemoryJournal::new();
    let store = SectionStore::new(Vec::new(), host_tx)
        .with_journal(journal.clone())
        .with_id_source(|| "new".to_string());
    let renderer = Renderer::new(options, dispatcher.clone());
    let mut app = AppState::new(store, renderer, dispatcher, action_rx, 100);
    app.ingest(LoaderEvent::Loaded(SectionUpdate {
        generation: 0,
        sections: document(),
    }));
    Harness { app, host, journal }
}

fn text_of(app: &AppState, id: &str) -> String {
    app.store
        .sections()
        .iter()
        .find_map(|node| find_by_id(node, id))
        .map(Node::text_content)
        .unwrap_or_default()
}

#[test]
fn test_starts_loading_until_loader_reports() {
    let (action_tx, action_rx) = mpsc::channel();
    let dispatcher = Dispatcher::from_sender(action_tx);
    let (host_tx, _host) = mpsc::channel::<HostMessage>();
    let store = SectionStore::new(Vec::new(), host_tx);
    let renderer = Renderer::new(RenderOptions::default(), dispatcher.clone());
    let mut app = AppState::new(store, renderer, dispatcher, action_rx, 80);

    assert_eq!(app.load_status, LoadStatus::Loading);
    assert_eq!(app.current_section_id(), None);

    app.ingest(LoaderEvent::Failed("no such file".to_string()));
    assert_eq!(app.load_status, LoadStatus::Failed("no such file".to_string()));
}

#[test]
fn test_loaded_sections_are_listed() {
    let Harness { app, .. } = harness(REORDER);

    assert_eq!(app.load_status, LoadStatus::Ready);
    assert_eq!(app.section_ids, vec!["a", "b", "c"]);
    assert_eq!(app.current_section_id(), Some("a"));
}

#[test]
fn test_edit_commits_and_journals() {
    let Harness {
        mut app, journal, ..
    } = harness(REORDER);

    app.enter_detail_view();
    assert_eq!(app.current_view, View::Detail);

    if let Some(ref mut editor_state) = app.editor_state {
        editor_state.lines = edtui::Lines::from("\nYeah\n");
    }
    app.exit_detail_view(true);

    assert_eq!(app.current_view, View::List);
    assert_eq!(text_of(&app, "a"), "Yeah");
    assert_eq!(text_of(&app, "b"), "Beta");
    assert_eq!(journal.log().edits, vec![EditRecord::add("a", "Yeah")]);
}

#[test]
fn test_discarding_edits_leaves_store_alone() {
    let Harness {
        mut app, journal, ..
    } = harness(RenderOptions::default());

    app.enter_detail_view();
    if let Some(ref mut editor_state) = app.editor_state {
        editor_state.lines = edtui::Lines::from("\nDiscarded\n");
    }
    app.exit_detail_view(false);

    assert_eq!(text_of(&app, "a"), "Alpha");
    assert!(journal.log().edits.is_empty());
}

#[test]
fn test_add_after_current_keeps_selection() {
    let Harness { mut app, host, .. } = harness(REORDER);

    app.add_after_current();

    assert_eq!(app.section_ids, vec!["a", "new", "b", "c"]);
    assert_eq!(app.current_section_id(), Some("a"));
    assert_eq!(app.store.sections()[1].key(), Some("layout-new"));
    assert_eq!(app.message.as_deref(), Some("Section added"));
    assert!(host.try_recv().is_err());
}

#[test]
fn test_delete_current_notifies_host() {
    for options in [REORDER, RenderOptions::default()] {
        let Harness { mut app, host, .. } = harness(options);
        app.current_section_index = 1;

        app.delete_current();

        assert_eq!(app.section_ids, vec!["a", "c"]);
        assert_eq!(
            host.try_recv().unwrap(),
            HostMessage::CommitSectionDelete {
                section_id: "b".to_string()
            }
        );
    }
}

#[test]
fn test_move_and_save_reorders_store() {
    let Harness { mut app, host, .. } = harness(REORDER);

    app.start_move();
    assert_eq!(app.move_state, MoveState::Selected);
    assert!(app.move_section_down());
    assert_eq!(app.move_state, MoveState::Moved);

    assert_eq!(app.section_ids, vec!["b", "a", "c"]);
    assert_eq!(app.current_section_id(), Some("a"));
    assert!(host.try_recv().is_err(), "nothing is committed while dragging");

    app.save_section_reorder();

    assert_eq!(app.move_state, MoveState::None);
    assert!(app.region.is_none());
    assert_eq!(
        host.try_recv().unwrap(),
        HostMessage::CommitSectionReorder {
            section_ids: vec!["b".to_string(), "a".to_string(), "c".to_string()]
        }
    );
    assert_eq!(app.section_ids, vec!["b", "a", "c"]);
}

#[test]
fn test_cancel_move_restores_order() {
    let Harness { mut app, host, .. } = harness(REORDER);

    app.start_move();
    app.move_section_to_bottom();
    assert_eq!(app.section_ids, vec!["b", "c", "a"]);

    app.cancel_move();

    assert_eq!(app.section_ids, vec!["a", "b", "c"]);
    assert_eq!(app.move_state, MoveState::None);
    assert!(host.try_recv().is_err());
}

#[test]
fn test_reload_discards_drag_and_ignores_stale_pushes() {
    let Harness { mut app, .. } = harness(REORDER);
    app.start_move();
    app.move_section_down();

    app.ingest(LoaderEvent::Replaced(SectionUpdate {
        generation: 2,
        sections: vec![wrapped("z", "Zeta")],
    }));
    assert_eq!(app.move_state, MoveState::None);
    assert_eq!(app.section_ids, vec!["z"]);

    app.ingest(LoaderEvent::Replaced(SectionUpdate {
        generation: 1,
        sections: document(),
    }));
    assert_eq!(app.section_ids, vec!["z"]);
}

#[test]
fn test_preview_blocks_every_mutation() {
    let options = RenderOptions {
        reorder_enabled: true,
        is_preview: true,
    };
    let Harness {
        mut app,
        host,
        journal,
    } = harness(options);

    app.enter_detail_view();
    if let Some(ref mut editor_state) = app.editor_state {
        editor_state.lines = edtui::Lines::from("\nChanged\n");
    }
    app.save_current();
    app.add_after_current();
    app.delete_current();
    app.start_move();

    assert_eq!(app.section_ids, vec!["a", "b", "c"]);
    assert_eq!(text_of(&app, "a"), "Alpha");
    assert_eq!(app.move_state, MoveState::None);
    assert!(host.try_recv().is_err());
    assert!(journal.log().edits.is_empty());
}

#[test]
fn test_reorder_disabled_refuses_to_grab() {
    let Harness { mut app, .. } = harness(RenderOptions::default());

    app.start_move();

    assert_eq!(app.move_state, MoveState::None);
    assert_eq!(app.message.as_deref(), Some("Reordering is disabled"));
}

#[test]
fn test_navigation_bounds() {
    let Harness { mut app, .. } = harness(REORDER);

    assert_eq!(app.find_prev_section(), None);
    assert_eq!(app.find_next_section(), Some(1));
    assert_eq!(app.navigate_to_first(), Some(0));
    assert_eq!(app.navigate_to_last(), Some(2));

    app.current_section_index = 2;
    assert_eq!(app.find_next_section(), None);
    assert_eq!(app.get_max_line_width(), 100);
}

#[test]
fn test_store_edits_refused_while_dragging() {
    let Harness {
        mut app,
        host,
        journal,
    } = harness(REORDER);

    app.start_move();
    app.move_section_down();

    app.add_after_current();
    assert_eq!(app.message.as_deref(), Some("Finish or cancel the move first"));
    app.delete_current();
    app.enter_detail_view();
    if let Some(ref mut editor_state) = app.editor_state {
        editor_state.lines = edtui::Lines::from("\nChanged\n");
    }
    app.save_current();

    assert_eq!(app.store.sections().len(), 3);
    assert!(host.try_recv().is_err());
    assert!(journal.log().edits.is_empty());

    app.save_section_reorder();

    assert_eq!(app.section_ids, vec!["b", "a", "c"]);
    assert_eq!(text_of(&app, "a"), "Alpha");
}

#[test]
fn test_added_section_survives_a_later_reorder() {
    let Harness { mut app, host, .. } = harness(REORDER);

    app.add_after_current();
    app.start_move();
    app.move_section_to_bottom();
    app.save_section_reorder();

    assert_eq!(app.section_ids, vec!["new", "b", "c", "a"]);
    assert_eq!(
        host.try_recv().unwrap(),
        HostMessage::CommitSectionReorder {
            section_ids: vec![
                "new".to_string(),
                "b".to_string(),
                "c".to_string(),
                "a".to_string()
            ]
        }
    );
}
