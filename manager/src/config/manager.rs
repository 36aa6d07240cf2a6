//! SettingsManager: DB-backed settings with defaults and env migration.

use std::collections::HashMap;

use manager_db::Database;

use super::defaults::DEFAULT_SETTINGS;
use super::{SettingInfo, SettingType};

/// Wraps [`Database`] to provide high-level settings operations.
pub struct SettingsManager {
    db: Database,
}

impl SettingsManager {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Get a setting value. Falls back to default if not in DB.
    pub fn get_setting(&self, key: &str) -> Result<String, anyhow::Error> {
        if let Some(val) = self.db.get_setting(key)? {
            return Ok(val);
        }
        if let Some(def) = DEFAULT_SETTINGS.get(key) {
            return Ok(def.default.to_string());
        }
        anyhow::bail!("setting not found: {key}");
    }

    /// Set a setting value. Only known keys are accepted.
    pub fn set_setting(&self, key: &str, value: &str) -> Result<(), anyhow::Error> {
        let def = DEFAULT_SETTINGS
            .get(key)
            .ok_or_else(|| anyhow::anyhow!("unknown setting key: {key}"))?;

        let type_str = if def.secret { "secret" } else { "normal" };
        self.db.set_setting(key, value, type_str)?;
        Ok(())
    }

    /// Get all settings, filling in defaults for missing keys.
    pub fn get_all_settings(&self) -> Result<HashMap<String, SettingInfo>, anyhow::Error> {
        let db_settings = self.db.get_all_settings()?;
        let mut result = HashMap::new();

        for (key, value) in &db_settings {
            let def = DEFAULT_SETTINGS.get(key.as_str());
            let setting_type = match def {
                Some(d) if d.secret => SettingType::Secret,
                _ => SettingType::Normal,
            };
            result.insert(
                key.clone(),
                SettingInfo {
                    key: key.clone(),
                    value: value.clone(),
                    setting_type,
                    required: def.is_some_and(|d| d.required),
                    description: def.map_or(String::new(), |d| d.description.to_string()),
                    has_value: !value.is_empty(),
                },
            );
        }

        for (key, def) in DEFAULT_SETTINGS.iter() {
            if !result.contains_key(*key) {
                result.insert(
                    key.to_string(),
                    SettingInfo {
                        key: key.to_string(),
                        value: def.default.to_string(),
                        setting_type: if def.secret {
                            SettingType::Secret
                        } else {
                            SettingType::Normal
                        },
                        required: def.required,
                        description: def.description.to_string(),
                        has_value: !def.default.is_empty(),
                    },
                );
            }
        }

        Ok(result)
    }

    /// Write defaults for keys missing from the DB.
    pub fn initialize_defaults(&self) -> Result<(), anyhow::Error> {
        for (key, def) in DEFAULT_SETTINGS.iter() {
            if self.db.get_setting(key)?.is_some() {
                continue;
            }
            let type_str = if def.secret { "secret" } else { "normal" };
            self.db.set_setting(key, def.default, type_str)?;
        }
        Ok(())
    }

    /// Migrate settings from environment variables to DB (one-time).
    pub fn migrate_from_env(&self) -> Result<u32, anyhow::Error> {
        let mut migrated = 0u32;
        for key in DEFAULT_SETTINGS.keys() {
            if self.db.get_setting(key)?.is_some() {
                continue;
            }
            if let Ok(env_val) = std::env::var(key) {
                if !env_val.is_empty() {
                    let def = &DEFAULT_SETTINGS[key];
                    let type_str = if def.secret { "secret" } else { "normal" };
                    self.db.set_setting(key, &env_val, type_str)?;
                    tracing::info!("Migrated setting from env: {key}");
                    migrated += 1;
                }
            }
        }
        if migrated > 0 {
            tracing::info!("Migration completed: {migrated} settings migrated");
        }
        Ok(migrated)
    }

    /// Generate and persist the per-profile device id if absent.
    pub fn ensure_device_id(&self) -> Result<String, anyhow::Error> {
        let current = self.get_setting("PUSH_DEVICE_ID")?;
        if !current.is_empty() {
            return Ok(current);
        }
        let id = uuid::Uuid::new_v4().to_string();
        self.set_setting("PUSH_DEVICE_ID", &id)?;
        tracing::info!("Generated push device id");
        Ok(id)
    }

    /// Keys that are required but still empty.
    pub fn missing_required(&self) -> Result<Vec<String>, anyhow::Error> {
        let mut missing: Vec<String> = DEFAULT_SETTINGS
            .values()
            .filter(|def| def.required)
            .filter(|def| {
                self.get_setting(def.key)
                    .map(|v| v.is_empty())
                    .unwrap_or(true)
            })
            .map(|def| def.key.to_string())
            .collect();
        missing.sort();
        Ok(missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sm() -> SettingsManager {
        SettingsManager::new(Database::open_in_memory().unwrap())
    }

    #[test]
    fn get_setting_falls_back_to_default() {
        let sm = sm();
        assert_eq!(sm.get_setting("PUSH_TOPIC").unwrap(), "messages");
    }

    #[test]
    fn set_setting_rejects_unknown_keys() {
        let sm = sm();
        assert!(sm.set_setting("NOT_A_KEY", "x").is_err());
    }

    #[test]
    fn ensure_device_id_is_stable() {
        let sm = sm();
        let first = sm.ensure_device_id().unwrap();
        let second = sm.ensure_device_id().unwrap();
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn missing_required_reports_empty_required_keys() {
        let sm = sm();
        let missing = sm.missing_required().unwrap();
        assert!(missing.contains(&"FEED_WS_URL".to_string()));
        sm.set_setting("FEED_WS_URL", "wss://docs.example.com/v1/listen")
            .unwrap();
        let missing = sm.missing_required().unwrap();
        assert!(!missing.contains(&"FEED_WS_URL".to_string()));
    }
}
