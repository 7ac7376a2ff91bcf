use super::{Node, NodeKind, TEXT_TAG};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn test_kind_is_decided_by_tag() {
    assert_eq!(NodeKind::of_tag("Section"), NodeKind::Composite);
    assert_eq!(NodeKind::of_tag("Sidebar"), NodeKind::Composite);
    assert_eq!(NodeKind::of_tag("div"), NodeKind::Opaque);
    assert_eq!(NodeKind::of_tag("input"), NodeKind::Opaque);
    assert_eq!(NodeKind::of_tag(TEXT_TAG), NodeKind::Opaque);
    assert_eq!(NodeKind::of_tag("Fragment"), NodeKind::Opaque);
    assert_eq!(NodeKind::of_tag(""), NodeKind::Opaque);
}

#[test]
fn test_kind_ignores_content() {
    let node = Node::element("div")
        .with_id("s1")
        .with_child(Node::element("Section"));
    assert!(!node.is_composite());
    assert!(node.children()[0].is_composite());
}

#[test]
fn test_deserialize_derives_kind() {
    let node: Node = serde_json::from_value(json!({
        "tag": "Columns",
        "key": "layout-s1",
        "children": [
            { "tag": "Section", "id": "s1", "props": { "title": "Intro" } },
            { "tag": "p" }
        ]
    }))
    .unwrap();

    assert_eq!(node.kind(), NodeKind::Composite);
    assert_eq!(node.key(), Some("layout-s1"));
    assert_eq!(node.children()[0].id(), Some("s1"));
    assert_eq!(node.children()[0].prop_str("title"), Some("Intro"));
    assert_eq!(node.children()[1].kind(), NodeKind::Opaque);
    assert!(node.capabilities().is_none());
}

#[test]
fn test_serialize_omits_derived_fields() {
    let node = Node::element("Section")
        .with_id("s1")
        .with_child(Node::text("hello"));

    let value = serde_json::to_value(&node).unwrap();
    assert_eq!(
        value,
        json!({
            "tag": "Section",
            "id": "s1",
            "children": [{ "tag": "#text", "props": { "text": "hello" } }]
        })
    );
}

#[test]
fn test_rebuild_keeps_everything_but_children() {
    let node = Node::element("Section")
        .with_id("s1")
        .with_key("k")
        .with_prop("style", "wide")
        .with_child(Node::text("old"));

    let rebuilt = node.rebuild(vec![Node::text("new")]);

    assert_eq!(rebuilt.tag(), "Section");
    assert_eq!(rebuilt.id(), Some("s1"));
    assert_eq!(rebuilt.key(), Some("k"));
    assert_eq!(rebuilt.prop_str("style"), Some("wide"));
    assert_eq!(rebuilt.children(), &[Node::text("new")]);
}

#[test]
fn test_text_content_joins_text_leaves() {
    let node = Node::element("Section").with_children(vec![
        Node::element("p").with_child(Node::text("one")),
        Node::element("input").with_prop("placeholder", "ignored"),
        Node::text("two"),
    ]);
    assert_eq!(node.text_content(), "one\ntwo");
}
