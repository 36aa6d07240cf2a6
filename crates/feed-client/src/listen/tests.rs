use super::connection::GatewayFrame;
use super::*;
use crate::{ChangeType, MessageStatus};

fn doc_json(id: &str, status: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": "Alice",
        "email": "alice@example.com",
        "subject": "Hello",
        "message": "Hi there",
        "timestamp": "2026-08-01T12:00:00Z",
        "status": status,
    })
}

#[test]
fn parse_snapshot_frame() {
    let raw = serde_json::json!({
        "type": "snapshot",
        "documents": [doc_json("m1", "unread"), doc_json("m2", "read")],
        "changes": [{ "change": "added", "doc": doc_json("m1", "unread") }],
    });
    let frame: GatewayFrame = serde_json::from_value(raw).unwrap();
    match frame {
        GatewayFrame::Snapshot { documents, changes } => {
            assert_eq!(documents.len(), 2);
            assert_eq!(documents[0].status, MessageStatus::Unread);
            assert_eq!(documents[1].status, MessageStatus::Read);
            assert_eq!(changes.len(), 1);
            assert_eq!(changes[0].kind, ChangeType::Added);
            assert_eq!(changes[0].doc.id, "m1");
        }
        other => panic!("unexpected frame: {other:?}"),
    }
}

#[test]
fn parse_snapshot_frame_without_changes() {
    let raw = serde_json::json!({
        "type": "snapshot",
        "documents": [doc_json("m1", "unread")],
    });
    let frame: GatewayFrame = serde_json::from_value(raw).unwrap();
    match frame {
        GatewayFrame::Snapshot { documents, changes } => {
            assert_eq!(documents.len(), 1);
            assert!(changes.is_empty());
        }
        other => panic!("unexpected frame: {other:?}"),
    }
}

#[test]
fn parse_optional_document_fields() {
    let mut raw = doc_json("m1", "unread");
    raw["company"] = serde_json::json!("Acme");
    let doc: MessageDoc = serde_json::from_value(raw).unwrap();
    assert_eq!(doc.company.as_deref(), Some("Acme"));
    assert!(doc.phone.is_none());
}

#[test]
fn parse_error_frame() {
    let raw = serde_json::json!({ "type": "error", "message": "connectivity lost" });
    let frame: GatewayFrame = serde_json::from_value(raw).unwrap();
    assert!(matches!(frame, GatewayFrame::Error { message } if message == "connectivity lost"));
}

#[test]
fn backoff_grows_and_caps() {
    assert_eq!(FeedClient::backoff_duration(1).as_secs(), 2);
    assert_eq!(FeedClient::backoff_duration(3).as_secs(), 8);
    assert_eq!(FeedClient::backoff_duration(12).as_secs(), 60);
}
