use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};
use tokio_rusqlite::Connection;

use crate::error::Result;

use super::schema::SCHEMA;

/// Durable string slots, the only persistence the app needs.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: String) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).await?;
        Self::with_connection(conn).await
    }

    #[cfg(test)]
    pub async fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().await?;
        Self::with_connection(conn).await
    }

    async fn with_connection(conn: Connection) -> Result<Self> {
        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let key = key.to_string();
        let value = self
            .conn
            .call(move |conn| {
                let value = conn
                    .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                        row.get::<_, String>(0)
                    })
                    .optional()?;
                Ok(value)
            })
            .await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let key = key.to_string();
        self.conn
            .call(move |conn| {
                conn.execute(
                    r#"INSERT INTO kv (key, value) VALUES (?1, ?2)
                       ON CONFLICT(key) DO UPDATE SET
                           value = excluded.value,
                           updated_at = datetime('now')"#,
                    params![key, value],
                )?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let key = key.to_string();
        self.conn
            .call(move |conn| {
                conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
                Ok(())
            })
            .await?;
        Ok(())
    }
}
