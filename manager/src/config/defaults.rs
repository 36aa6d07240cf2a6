//! All setting definitions with their default values.

use std::collections::HashMap;
use std::sync::LazyLock;

type DefTuple = (&'static str, &'static str, bool, bool, &'static str);

// (key, default, secret, required, description)
const DEFS: &[DefTuple] = &[
    (
        "FEED_WS_URL",
        "",
        false,
        true,
        "Document gateway WebSocket endpoint",
    ),
    (
        "FEED_API_URL",
        "",
        false,
        true,
        "Document gateway REST endpoint",
    ),
    (
        "FEED_COLLECTION",
        "messages",
        false,
        false,
        "Collection holding contact-form messages",
    ),
    (
        "PUSH_GATEWAY_URL",
        "",
        false,
        true,
        "Push gateway base URL",
    ),
    ("PUSH_API_KEY", "", true, true, "Push gateway API key"),
    (
        "PUSH_SENDER_ID",
        "",
        false,
        false,
        "Sender id presented when registering for push delivery",
    ),
    (
        "PUSH_APP_ID",
        "",
        false,
        false,
        "Application id presented when registering for push delivery",
    ),
    (
        "PUSH_VAPID_KEY",
        "",
        true,
        false,
        "VAPID key for push registration",
    ),
    (
        "PUSH_TOPIC",
        "messages",
        false,
        false,
        "Topic new-message pushes are broadcast on",
    ),
    (
        "PUSH_DEVICE_ID",
        "",
        false,
        false,
        "Per-profile device id (generated on first run)",
    ),
    ("SERVER_PORT", "8080", false, false, "Dashboard server port"),
    (
        "ALERT_DURATION_SECS",
        "10",
        false,
        false,
        "Seconds before a system alert self-dismisses",
    ),
    (
        "NOTIFICATIONS_ENABLED",
        "true",
        false,
        false,
        "Master switch for the notification system",
    ),
];

/// A single setting definition.
#[derive(Debug, Clone)]
pub struct SettingDef {
    pub key: &'static str,
    pub default: &'static str,
    pub secret: bool,
    pub required: bool,
    pub description: &'static str,
}

/// Global setting definitions indexed by key.
pub static DEFAULT_SETTINGS: LazyLock<HashMap<&'static str, SettingDef>> = LazyLock::new(|| {
    DEFS.iter()
        .map(|&(key, default, secret, required, description)| {
            (
                key,
                SettingDef {
                    key,
                    default,
                    secret,
                    required,
                    description,
                },
            )
        })
        .collect()
});

/// Get the default value for a setting key, or `None` if not defined.
pub fn get_default(key: &str) -> Option<&'static str> {
    DEFAULT_SETTINGS.get(key).map(|d| d.default)
}
