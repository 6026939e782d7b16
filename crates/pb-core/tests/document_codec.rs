//! Integration tests: document codec (pb-core).
//!
//! Loads a saved landing page and checks that it survives the JSON and
//! MessagePack encodings the host uses.

use pb_core::document::Document;
use pb_core::id::ItemId;
use pb_core::lint::{LintSeverity, lint_items};
use pb_core::model::*;
use pretty_assertions::assert_eq;

fn landing_page() -> Document {
    Document::from_json(include_str!("fixtures/landing_page.json")).unwrap()
}

// ─── Loading ─────────────────────────────────────────────────────────────

#[test]
fn fixture_loads_with_defaults() {
    let doc = landing_page();
    assert_eq!(doc.items().len(), 3);

    let hero = &doc.items()[0];
    assert_eq!(hero.id, ItemId::intern("image_1700000000000"));
    assert_eq!(hero.kind, ItemKind::Image);
    assert_eq!(hero.size, Size::new(800.0, 400.0));
    assert_eq!(hero.props["fit"], serde_json::json!("cover"));

    // Absent flags fall back to unlocked and visible.
    let headline = &doc.items()[1];
    assert!(!headline.locked);
    assert!(headline.visible);
    assert_eq!(headline.description, "");
    assert_eq!(headline.custom_styles, None);
}

#[test]
fn undersized_items_are_floored_on_load() {
    let doc = landing_page();
    let form = &doc.items()[2];
    assert_eq!(form.size, Size::new(300.0, 50.0));
    assert!(form.locked);
    assert!(!form.visible);
}

#[test]
fn bare_array_matches_wrapped_document() {
    let doc = landing_page();
    let bare = Document::from_json(&doc.to_json()).unwrap();
    assert_eq!(bare, doc);
}

// ─── Round trips ─────────────────────────────────────────────────────────

#[test]
fn json_roundtrip_preserves_order_and_fields() {
    let doc = landing_page();
    let json = doc.to_json();
    let back = Document::from_json(&json).unwrap();
    let ids: Vec<&str> = back.items().iter().map(|i| i.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "image_1700000000000",
            "heading_1700000000100",
            "contact-form_1700000000200"
        ]
    );
    assert_eq!(back, doc);
}

#[test]
fn msgpack_roundtrip() {
    let doc = landing_page();
    let bytes = doc.to_msgpack().unwrap();
    assert_eq!(Document::from_msgpack(&bytes).unwrap(), doc);
}

#[test]
fn corrupt_msgpack_is_an_error() {
    assert!(Document::from_msgpack(&[0xc1, 0x00, 0x13]).is_err());
}

#[test]
fn duplicate_ids_rejected_from_json() {
    let json = r#"[{"id":"dup_1","type":"text"},{"id":"dup_1","type":"map"}]"#;
    let err = Document::from_json(json).unwrap_err();
    assert!(err.contains("dup_1"), "unexpected error: {err}");
}

// ─── Lint ────────────────────────────────────────────────────────────────

#[test]
fn loaded_page_lints_clean_of_warnings() {
    let doc = landing_page();
    let diags = lint_items(doc.items(), Size::new(1200.0, 800.0));
    assert!(
        diags.iter().all(|d| d.severity != LintSeverity::Warning),
        "unexpected warnings: {diags:?}"
    );
}
