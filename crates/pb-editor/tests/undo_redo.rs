//! Integration tests: history (pb-editor).
//!
//! Drives the `Editor` the way the admin page does and checks that every
//! accepted change can be undone and redone, across crate boundaries.

use pb_core::catalog;
use pb_core::clock::StepClock;
use pb_core::config::EditorConfig;
use pb_core::document::Document;
use pb_core::id::ItemId;
use pb_core::model::*;
use pb_editor::editor::Editor;
use pb_editor::selection::Selection;
use pb_editor::shortcuts::{FocusContext, KeyEvent, ShortcutAction};
use pb_editor::store::StoreMutation;
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn make_editor(config: EditorConfig) -> Editor {
    init_logging();
    let doc = Document::from_json(include_str!("fixtures/canvas_page.json")).unwrap();
    let mut editor = Editor::with_clock(config, Box::new(StepClock::new(1_000, 1)));
    editor.load(doc);
    editor
}

fn id(s: &str) -> ItemId {
    ItemId::intern(s)
}

fn position(editor: &Editor, s: &str) -> Position {
    editor.item(id(s)).unwrap().position
}

// ─── Basic undo/redo ────────────────────────────────────────────────────

#[test]
fn load_starts_with_single_snapshot() {
    let editor = make_editor(EditorConfig::default());
    assert_eq!(editor.items().len(), 3);
    assert_eq!(editor.history().len(), 1);
    assert!(!editor.can_undo());
    assert!(!editor.can_redo());
}

#[test]
fn undo_restores_previous_state() {
    let mut editor = make_editor(EditorConfig::default());

    assert!(editor.apply(StoreMutation::Move {
        id: id("cp_banner"),
        position: Position::new(200.0, 100.0),
    }));
    assert_eq!(position(&editor, "cp_banner"), Position::new(200.0, 100.0));

    assert!(editor.undo());
    assert_eq!(
        position(&editor, "cp_banner"),
        Position::new(0.0, 0.0),
        "position not restored after undo"
    );
}

#[test]
fn redo_reapplies_undone_action() {
    let mut editor = make_editor(EditorConfig::default());
    editor.apply(StoreMutation::Resize {
        id: id("cp_title"),
        size: Size::new(500.0, 100.0),
    });
    editor.undo();
    assert_eq!(
        editor.item(id("cp_title")).unwrap().size,
        Size::new(300.0, 60.0)
    );
    assert!(editor.redo());
    assert_eq!(
        editor.item(id("cp_title")).unwrap().size,
        Size::new(500.0, 100.0)
    );
}

#[test]
fn multi_step_chain_unwinds_in_order() {
    let mut editor = make_editor(EditorConfig::default());
    let heading = catalog::find("heading").unwrap().clone();

    let added = editor.add_template(heading, Position::new(600.0, 600.0)).unwrap();
    editor.select(Selection::single(id("cp_banner")));
    editor.duplicate_selected();
    editor.select(Selection::single(id("cp_title")));
    editor.delete_selected();
    assert_eq!(editor.items().len(), 4);
    assert!(editor.item(id("cp_title")).is_none());

    editor.undo();
    assert!(editor.item(id("cp_title")).is_some());
    assert_eq!(editor.items().len(), 5);

    editor.undo();
    assert_eq!(editor.items().len(), 4);
    assert!(editor.item(added).is_some());

    editor.undo();
    assert_eq!(editor.items().len(), 3);
    assert!(editor.item(added).is_none());
    assert!(!editor.can_undo());
}

#[test]
fn new_edit_after_undo_discards_redo() {
    let mut editor = make_editor(EditorConfig::default());
    editor.select(Selection::single(id("cp_banner")));
    editor.nudge(10.0, 0.0);
    editor.nudge(10.0, 0.0);
    editor.undo();
    assert!(editor.can_redo());

    editor.nudge(0.0, 5.0);
    assert!(!editor.can_redo());
    assert_eq!(position(&editor, "cp_banner"), Position::new(10.0, 5.0));
    assert_eq!(editor.history().len(), 3);
}

#[test]
fn undo_prunes_selection_of_vanished_items() {
    let mut editor = make_editor(EditorConfig::default());
    editor.select(Selection::single(id("cp_banner")));
    editor.duplicate_selected();
    let copy = editor.selection().only().unwrap();
    assert_ne!(copy, id("cp_banner"));

    editor.undo();
    assert!(editor.item(copy).is_none());
    assert!(editor.selection().is_empty());
}

// ─── Depth cap ───────────────────────────────────────────────────────────

#[test]
fn history_is_capped_at_configured_depth() {
    let config = EditorConfig {
        history_depth: 5,
        ..Default::default()
    };
    let mut editor = make_editor(config);
    editor.select(Selection::single(id("cp_title")));
    for _ in 0..10 {
        editor.nudge(1.0, 0.0);
    }
    assert_eq!(editor.history().len(), 5);
    assert_eq!(position(&editor, "cp_title"), Position::new(50.0, 240.0));

    let mut undone = 0;
    while editor.undo() {
        undone += 1;
    }
    assert_eq!(undone, 4);
    // The oldest snapshots were dropped, so the load state is unreachable.
    assert_eq!(position(&editor, "cp_title"), Position::new(46.0, 240.0));
}

// ─── Host notification ───────────────────────────────────────────────────

#[test]
fn every_history_step_notifies_host() {
    let mut editor = make_editor(EditorConfig::default());
    let counts = Rc::new(RefCell::new(Vec::new()));
    let sink = counts.clone();
    editor.set_on_change(Box::new(move |items: &[PlacedItem]| {
        sink.borrow_mut().push(items.len())
    }));

    editor.select(Selection::single(id("cp_banner")));
    editor.delete_selected();
    editor.undo();
    editor.redo();
    assert_eq!(*counts.borrow(), vec![2, 3, 2]);
}

#[test]
fn keyboard_undo_redo() {
    let mut editor = make_editor(EditorConfig::default());
    editor.select(Selection::single(id("cp_banner")));
    editor.run(ShortcutAction::Delete);

    let undo = editor.handle_key(&KeyEvent::new("z").meta(), FocusContext::Canvas);
    assert!(undo.handled);
    assert_eq!(editor.items().len(), 3);

    let redo = editor.handle_key(&KeyEvent::new("z").ctrl().shift(), FocusContext::Canvas);
    assert_eq!(redo.action, Some(ShortcutAction::Redo));
    assert!(redo.handled);
    assert_eq!(editor.items().len(), 2);

    let again = editor.handle_key(&KeyEvent::new("y").ctrl(), FocusContext::Canvas);
    assert!(!again.handled, "nothing left to redo");
}

#[test]
fn selection_changes_are_not_history() {
    let mut editor = make_editor(EditorConfig::default());
    editor.select_all();
    editor.deselect();
    editor.select(Selection::single(id("cp_map")));
    assert_eq!(editor.history().len(), 1);
}
