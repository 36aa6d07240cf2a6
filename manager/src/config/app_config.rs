//! Runtime application configuration loaded from DB + environment overrides.

use push_client::AppCredentials;

use super::manager::SettingsManager;

/// Runtime configuration populated from the settings DB.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub feed_ws_url: String,
    pub feed_api_url: String,
    pub feed_collection: String,
    pub push_gateway_url: String,
    pub push_api_key: String,
    pub push_sender_id: String,
    pub push_app_id: String,
    pub push_vapid_key: String,
    pub push_topic: String,
    pub device_id: String,
    pub server_port: u16,
    pub alert_duration_secs: u64,
    pub notifications_enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            feed_ws_url: String::new(),
            feed_api_url: String::new(),
            feed_collection: "messages".into(),
            push_gateway_url: String::new(),
            push_api_key: String::new(),
            push_sender_id: String::new(),
            push_app_id: String::new(),
            push_vapid_key: String::new(),
            push_topic: "messages".into(),
            device_id: String::new(),
            server_port: 8080,
            alert_duration_secs: 10,
            notifications_enabled: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from the settings manager (DB-first, env overrides).
    pub fn load(sm: &SettingsManager) -> Result<Self, anyhow::Error> {
        let g = |key: &str| -> String { sm.get_setting(key).unwrap_or_default() };

        let mut server_port = parse_u16(&g("SERVER_PORT"), 8080);
        if let Ok(v) = std::env::var("SERVER_PORT") {
            if let Ok(p) = v.parse::<u16>() {
                server_port = p;
            }
        }

        Ok(Self {
            feed_ws_url: g("FEED_WS_URL"),
            feed_api_url: g("FEED_API_URL"),
            feed_collection: {
                let c = g("FEED_COLLECTION");
                if c.is_empty() { "messages".into() } else { c }
            },
            push_gateway_url: g("PUSH_GATEWAY_URL"),
            push_api_key: g("PUSH_API_KEY"),
            push_sender_id: g("PUSH_SENDER_ID"),
            push_app_id: g("PUSH_APP_ID"),
            push_vapid_key: g("PUSH_VAPID_KEY"),
            push_topic: {
                let t = g("PUSH_TOPIC");
                if t.is_empty() { "messages".into() } else { t }
            },
            device_id: g("PUSH_DEVICE_ID"),
            server_port,
            alert_duration_secs: parse_u64(&g("ALERT_DURATION_SECS"), 10),
            notifications_enabled: g("NOTIFICATIONS_ENABLED") != "false",
        })
    }

    /// Credentials presented to the push gateway when registering.
    pub fn credentials(&self) -> AppCredentials {
        AppCredentials {
            api_key: self.push_api_key.clone(),
            sender_id: self.push_sender_id.clone(),
            app_id: self.push_app_id.clone(),
            vapid_key: self.push_vapid_key.clone(),
        }
    }
}

fn parse_u16(s: &str, default: u16) -> u16 {
    s.parse().unwrap_or(default)
}

fn parse_u64(s: &str, default: u64) -> u64 {
    s.parse().unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use manager_db::Database;

    #[test]
    fn load_uses_defaults_for_missing_values() {
        let sm = SettingsManager::new(Database::open_in_memory().unwrap());
        let config = AppConfig::load(&sm).unwrap();
        assert_eq!(config.feed_collection, "messages");
        assert_eq!(config.push_topic, "messages");
        assert_eq!(config.alert_duration_secs, 10);
        assert!(config.notifications_enabled);
    }

    #[test]
    fn load_reads_stored_values() {
        let sm = SettingsManager::new(Database::open_in_memory().unwrap());
        sm.set_setting("FEED_WS_URL", "wss://docs.example.com/v1/listen")
            .unwrap();
        sm.set_setting("ALERT_DURATION_SECS", "5").unwrap();
        let config = AppConfig::load(&sm).unwrap();
        assert_eq!(config.feed_ws_url, "wss://docs.example.com/v1/listen");
        assert_eq!(config.alert_duration_secs, 5);
    }

    #[test]
    fn parse_helpers_fall_back_on_garbage() {
        assert_eq!(parse_u16("not-a-port", 8080), 8080);
        assert_eq!(parse_u64("", 10), 10);
    }
}
