use libsql::{Builder, Connection, Database as LibsqlDatabase};
use std::time::Duration;
use tokio::sync::Mutex;

use crate::error::KvError;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS kv (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
    );
"#;

pub struct SqliteKv {
    db: LibsqlDatabase,
    conn: Connection,
    write_lock: Mutex<()>,
    replica: bool,
}

impl SqliteKv {
    pub fn is_replica(turso_url: &Option<String>, turso_auth_token: &Option<String>) -> bool {
        turso_url.is_some() && turso_auth_token.is_some()
    }

    pub async fn open(
        path: &str,
        turso_url: Option<String>,
        turso_auth_token: Option<String>,
        sync_interval_seconds: u64,
    ) -> Result<Self, KvError> {
        let replica = Self::is_replica(&turso_url, &turso_auth_token);
        let db = match (turso_url, turso_auth_token) {
            (Some(url), Some(token)) => {
                tracing::info!("[kv] running sqlite store as synced replica of {}", url);
                Builder::new_synced_database(path, url, token)
                    .sync_interval(Duration::from_secs(sync_interval_seconds))
                    .build()
                    .await?
            }
            _ => {
                tracing::info!("[kv] running sqlite store at {}", path);
                Builder::new_local(path).build().await?
            }
        };

        let conn = db.connect()?;
        conn.execute_batch(SCHEMA).await?;

        Ok(Self {
            db,
            conn,
            write_lock: Mutex::new(()),
            replica,
        })
    }

    pub async fn in_memory() -> Result<Self, KvError> {
        Self::open(":memory:", None, None, 0).await
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let mut rows = self
            .conn
            .query("SELECT value FROM kv WHERE key = ?1", libsql::params![key])
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(row.get::<String>(0)?)),
            None => Ok(None),
        }
    }

    pub async fn put(&self, key: &str, value: String) -> Result<(), KvError> {
        let query = r#"
            INSERT INTO kv (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        "#;

        let _guard = self.write_lock.lock().await;
        self.conn.execute(query, libsql::params![key, value]).await?;

        if self.replica {
            if let Err(e) = self.db.sync().await {
                tracing::warn!("[kv] replica sync after write failed: {}", e);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_overwrites_existing_value() {
        let kv = SqliteKv::in_memory().await.unwrap();
        assert_eq!(kv.get("k").await.unwrap(), None);

        kv.put("k", "one".into()).await.unwrap();
        kv.put("k", "two".into()).await.unwrap();
        assert_eq!(kv.get("k").await.unwrap().as_deref(), Some("two"));
    }
}
