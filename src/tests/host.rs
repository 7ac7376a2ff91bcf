use super::{HostChannel, HostMessage, NdjsonHost};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::mpsc;

#[test]
fn test_wire_shape() {
    let reorder = HostMessage::CommitSectionReorder {
        section_ids: vec!["b".to_string(), "a".to_string()],
    };
    let delete = HostMessage::CommitSectionDelete {
        section_id: "a".to_string(),
    };

    assert_eq!(
        serde_json::to_value(&reorder).unwrap(),
        json!({"type": "commit-section-reorder", "sectionIds": ["b", "a"]})
    );
    assert_eq!(
        serde_json::to_value(&delete).unwrap(),
        json!({"type": "commit-section-delete", "sectionId": "a"})
    );
}

#[test]
fn test_ndjson_host_writes_one_line_per_message() {
    let mut host = NdjsonHost::new(Vec::new());
    host.post(HostMessage::CommitSectionDelete {
        section_id: "x".to_string(),
    });
    host.post(HostMessage::CommitSectionReorder {
        section_ids: vec!["y".to_string()],
    });

    let output = String::from_utf8(host.into_inner()).unwrap();
    let messages: Vec<HostMessage> = output
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(
        messages,
        vec![
            HostMessage::CommitSectionDelete {
                section_id: "x".to_string()
            },
            HostMessage::CommitSectionReorder {
                section_ids: vec!["y".to_string()]
            },
        ]
    );
}

#[test]
fn test_closed_channel_drops_silently() {
    let (mut tx, rx) = mpsc::channel::<HostMessage>();
    drop(rx);
    tx.post(HostMessage::CommitSectionDelete {
        section_id: "gone".to_string(),
    });
}
