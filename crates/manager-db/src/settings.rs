//! Application settings key-value store.

use std::collections::HashMap;

use crate::{Database, DbError, OptionalExt};

impl Database {
    pub fn get_setting(&self, key: &str) -> Result<Option<String>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT value FROM settings WHERE key = ?1")?;
            let value = stmt
                .query_row([key], |row| row.get::<_, String>(0))
                .optional()?;
            Ok(value)
        })
    }

    pub fn set_setting(&self, key: &str, value: &str, setting_type: &str) -> Result<(), DbError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO settings (key, value, setting_type, updated_at) VALUES (?1, ?2, ?3, CURRENT_TIMESTAMP)
                 ON CONFLICT(key) DO UPDATE SET value = ?2, setting_type = ?3, updated_at = CURRENT_TIMESTAMP",
                rusqlite::params![key, value, setting_type],
            )?;
            Ok(())
        })
    }

    pub fn get_all_settings(&self) -> Result<HashMap<String, String>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT key, value FROM settings")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?;
            let mut map = HashMap::new();
            for row in rows {
                let (k, v) = row?;
                map.insert(k, v);
            }
            Ok(map)
        })
    }

    pub fn delete_setting(&self, key: &str) -> Result<(), DbError> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM settings WHERE key = ?1", [key])?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::Database;

    #[test]
    fn test_set_and_get_setting() {
        let db = Database::open_in_memory().unwrap();
        db.set_setting("PUSH_TOPIC", "messages", "normal").unwrap();
        assert_eq!(
            db.get_setting("PUSH_TOPIC").unwrap().as_deref(),
            Some("messages")
        );
    }

    #[test]
    fn test_get_missing_setting_returns_none() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_setting("NO_SUCH_KEY").unwrap().is_none());
    }

    #[test]
    fn test_set_setting_upserts() {
        let db = Database::open_in_memory().unwrap();
        db.set_setting("SERVER_PORT", "8080", "normal").unwrap();
        db.set_setting("SERVER_PORT", "9090", "normal").unwrap();
        assert_eq!(
            db.get_setting("SERVER_PORT").unwrap().as_deref(),
            Some("9090")
        );
        assert_eq!(db.get_all_settings().unwrap().len(), 1);
    }

    #[test]
    fn test_delete_setting() {
        let db = Database::open_in_memory().unwrap();
        db.set_setting("PUSH_DEVICE_ID", "abc", "normal").unwrap();
        db.delete_setting("PUSH_DEVICE_ID").unwrap();
        assert!(db.get_setting("PUSH_DEVICE_ID").unwrap().is_none());
    }
}
