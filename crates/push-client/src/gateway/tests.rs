use super::foreground::StreamFrame;
use super::*;
use crate::PushPayload;

#[test]
fn parse_permission_states() {
    for (raw, expected) in [
        ("default", PermissionState::Default),
        ("granted", PermissionState::Granted),
        ("denied", PermissionState::Denied),
    ] {
        let resp: PermissionResponse =
            serde_json::from_str(&format!("{{\"permission\":\"{raw}\"}}")).unwrap();
        assert_eq!(resp.permission, expected);
    }
}

#[test]
fn parse_registration_response() {
    let resp: RegistrationResponse =
        serde_json::from_str("{\"token\":\"reg-token-1\"}").unwrap();
    assert_eq!(resp.token, "reg-token-1");
}

#[test]
fn parse_push_frame_with_notification() {
    let raw = serde_json::json!({
        "type": "push",
        "payload": {
            "notification": { "title": "Ping", "body": "Test" },
            "data": { "url": "/" },
        }
    });
    let frame: StreamFrame = serde_json::from_value(raw).unwrap();
    match frame {
        StreamFrame::Push { payload } => {
            let content = payload.notification.unwrap();
            assert_eq!(content.title.as_deref(), Some("Ping"));
            assert_eq!(content.body.as_deref(), Some("Test"));
            assert_eq!(payload.data.get("url").map(String::as_str), Some("/"));
        }
        other => panic!("unexpected frame: {other:?}"),
    }
}

#[test]
fn parse_push_frame_without_fields() {
    let raw = serde_json::json!({ "type": "push", "payload": {} });
    let frame: StreamFrame = serde_json::from_value(raw).unwrap();
    match frame {
        StreamFrame::Push { payload } => assert_eq!(payload, PushPayload::default()),
        other => panic!("unexpected frame: {other:?}"),
    }
}

#[test]
fn endpoint_joins_device_path() {
    let gw = PushGateway::new("https://push.example.com/", "dev-1").unwrap();
    let url = gw.endpoint("v1/devices/dev-1/permission").unwrap();
    assert_eq!(
        url.as_str(),
        "https://push.example.com/v1/devices/dev-1/permission"
    );
}
