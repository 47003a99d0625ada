mod common;

use cloudnav::config::KvConfig;
use cloudnav::error::KvError;
use cloudnav::kv::{HttpKv, KvStore, MemoryKv, SqliteKv};

use common::{MockKvApi, spawn};

async fn exercise(store: &KvStore) {
    assert_eq!(store.get("app_data:links").await.unwrap(), None);

    store.put("app_data:links", "[]".to_string()).await.unwrap();
    assert_eq!(store.get("app_data:links").await.unwrap().as_deref(), Some("[]"));

    store.put("app_data:links", "[1]".to_string()).await.unwrap();
    assert_eq!(store.get("app_data:links").await.unwrap().as_deref(), Some("[1]"));
    assert_eq!(store.get("app_data:categories").await.unwrap(), None);
}

#[tokio::test]
async fn memory_store_honours_contract() {
    exercise(&KvStore::Memory(MemoryKv::new())).await;
}

#[tokio::test]
async fn memory_store_from_config() {
    let store = KvStore::from_config(&KvConfig::Memory).await.unwrap();
    assert_eq!(store.backend_name(), "memory");
    exercise(&store).await;
}

#[tokio::test]
async fn sqlite_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kv.db");
    let path = path.to_str().unwrap().to_string();

    {
        let store = KvStore::Sqlite(SqliteKv::open(&path, None, None, 60).await.unwrap());
        exercise(&store).await;
    }

    let reopened = KvStore::from_config(&KvConfig::Sqlite {
        path: path.clone(),
        turso_url: None,
        turso_auth_token: None,
        sync_interval_seconds: 60,
    })
    .await
    .unwrap();
    assert_eq!(reopened.backend_name(), "sqlite");
    assert_eq!(reopened.get("app_data:links").await.unwrap().as_deref(), Some("[1]"));
}

#[tokio::test]
async fn http_store_honours_contract() {
    let api = MockKvApi::default();
    let base = spawn(api.router("kv-token")).await;
    let store = KvStore::Http(HttpKv::new(&format!("{}/kv/", base), "kv-token"));

    exercise(&store).await;
    assert_eq!(
        api.values.lock().unwrap().get("app_data:links").map(String::as_str),
        Some("[1]")
    );
}

#[tokio::test]
async fn http_store_surfaces_auth_failures() {
    let api = MockKvApi::default();
    let base = spawn(api.router("kv-token")).await;
    let store = KvStore::Http(HttpKv::new(&format!("{}/kv", base), "wrong"));

    assert!(matches!(
        store.get("app_data:links").await,
        Err(KvError::HttpStatus(401))
    ));
    assert!(matches!(
        store.put("app_data:links", "[]".to_string()).await,
        Err(KvError::HttpStatus(401))
    ));
    assert!(api.values.lock().unwrap().is_empty());
}
