//! Key-Value Adapter
//!
//! A uniform `get`/`put` contract over the backends a deployment can be
//! configured with. The backend is picked once at startup from [`KvConfig`];
//! every call after that goes to the same backend.
//!
//! Values are opaque strings. Reads return `Ok(None)` for absent keys, writes
//! surface failures to the caller without retrying.

mod http;
mod memory;
mod s3;
mod sqlite;

pub use http::HttpKv;
pub use memory::MemoryKv;
pub use s3::S3Kv;
pub use sqlite::SqliteKv;

use crate::config::KvConfig;
use crate::error::KvError;

pub enum KvStore {
    Memory(MemoryKv),
    Sqlite(SqliteKv),
    Http(HttpKv),
    S3(S3Kv),
}

impl KvStore {
    pub async fn from_config(cfg: &KvConfig) -> Result<Self, KvError> {
        let store = match cfg {
            KvConfig::Memory => {
                tracing::warn!("[kv] using in-memory store, data will not survive a restart");
                KvStore::Memory(MemoryKv::new())
            }
            KvConfig::Sqlite {
                path,
                turso_url,
                turso_auth_token,
                sync_interval_seconds,
            } => KvStore::Sqlite(
                SqliteKv::open(path, turso_url.clone(), turso_auth_token.clone(), *sync_interval_seconds)
                    .await?,
            ),
            KvConfig::Http { api_url, api_token } => {
                tracing::info!("[kv] using http api at {}", api_url);
                KvStore::Http(HttpKv::new(api_url, api_token))
            }
            KvConfig::S3 { .. } => KvStore::S3(S3Kv::new(cfg).await?),
        };
        Ok(store)
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            KvStore::Memory(_) => "memory",
            KvStore::Sqlite(_) => "sqlite",
            KvStore::Http(_) => "http",
            KvStore::S3(_) => "s3",
        }
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        match self {
            KvStore::Memory(kv) => kv.get(key),
            KvStore::Sqlite(kv) => kv.get(key).await,
            KvStore::Http(kv) => kv.get(key).await,
            KvStore::S3(kv) => kv.get(key).await,
        }
    }

    pub async fn put(&self, key: &str, value: String) -> Result<(), KvError> {
        let result = match self {
            KvStore::Memory(kv) => kv.put(key, value),
            KvStore::Sqlite(kv) => kv.put(key, value).await,
            KvStore::Http(kv) => kv.put(key, value).await,
            KvStore::S3(kv) => kv.put(key, value).await,
        };
        if let Err(e) = &result {
            tracing::error!(backend = self.backend_name(), key, "kv put failed: {}", e);
        }
        result
    }
}
