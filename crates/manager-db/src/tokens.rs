//! Push registration token storage.
//!
//! At most one token is live per profile; the newest row wins.

use crate::{Database, DbError, OptionalExt};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushToken {
    pub token: String,
    pub topic: Option<String>,
    pub issued_at: i64,
}

impl Database {
    pub fn save_push_token(&self, token: &PushToken) -> Result<(), DbError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO push_tokens (token, topic, issued_at) VALUES (?1, ?2, ?3)",
                rusqlite::params![token.token, token.topic, token.issued_at],
            )?;
            Ok(())
        })
    }

    pub fn get_latest_push_token(&self) -> Result<Option<PushToken>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT token, topic, issued_at FROM push_tokens ORDER BY id DESC LIMIT 1",
            )?;
            let token = stmt
                .query_row([], |row| {
                    Ok(PushToken {
                        token: row.get(0)?,
                        topic: row.get(1)?,
                        issued_at: row.get(2)?,
                    })
                })
                .optional()?;
            Ok(token)
        })
    }

    pub fn delete_all_push_tokens(&self) -> Result<(), DbError> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM push_tokens", [])?;
            Ok(())
        })
    }
}
