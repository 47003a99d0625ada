//! Storage Module
//!
//! Persists the dashboard snapshot in the key-value store under split keys and
//! exposes it at `/api/storage`.
//!
//! # Layout
//!
//! - `app_data:timestamp` - last write time in ms, also the first-run marker
//! - `app_data:links` - links with embedded icons removed
//! - `app_data:categories`
//! - `app_data:settings`
//! - `app_data:icons` - link id to `data:image` icon
//!
//! Writes fan out to all keys at once. There is no transaction across them, so
//! a failed write can leave keys from different snapshots side by side.

mod handler;
pub mod icons;
mod routes;

pub use routes::routes;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::defaults;
use crate::error::StorageError;
use crate::kv::KvStore;
use crate::model::{Category, Link, SaveRequest, SiteSettings, Snapshot};
use icons::{IconMap, merge_icons, split_icons};

pub const TIMESTAMP_KEY: &str = "app_data:timestamp";
pub const LINKS_KEY: &str = "app_data:links";
pub const CATEGORIES_KEY: &str = "app_data:categories";
pub const SETTINGS_KEY: &str = "app_data:settings";
pub const ICONS_KEY: &str = "app_data:icons";

pub struct SnapshotStore<'a> {
    kv: &'a KvStore,
}

impl<'a> SnapshotStore<'a> {
    pub fn new(kv: &'a KvStore) -> Self {
        Self { kv }
    }

    /// Reads the current snapshot, seeding the store with defaults on first use.
    pub async fn load(&self) -> Result<Snapshot, StorageError> {
        let Some(raw_timestamp) = self.kv.get(TIMESTAMP_KEY).await? else {
            return Ok(self.initialize().await);
        };

        let timestamp = raw_timestamp.trim().parse::<i64>().unwrap_or_else(|_| {
            tracing::warn!("stored timestamp {:?} is not a number, reading as 0", raw_timestamp);
            0
        });

        let (links, categories, settings, icons) = tokio::try_join!(
            self.read_json::<Vec<Link>>(LINKS_KEY),
            self.read_json::<Vec<Category>>(CATEGORIES_KEY),
            self.read_json::<SiteSettings>(SETTINGS_KEY),
            self.read_json::<IconMap>(ICONS_KEY),
        )?;

        let mut links = links.unwrap_or_default();
        if let Some(icons) = icons {
            merge_icons(&mut links, &icons);
        }

        Ok(Snapshot {
            links,
            categories: categories.unwrap_or_default(),
            settings: settings.unwrap_or_default(),
            timestamp,
        })
    }

    /// Writes every key of the request. Returns the timestamp now stored.
    pub async fn save(&self, request: SaveRequest, now: i64) -> Result<i64, StorageError> {
        let settings = request.effective_settings();
        let timestamp = request.timestamp.unwrap_or(now);
        let (links, icons) = split_icons(request.links);

        tracing::info!(
            timestamp,
            links = links.len(),
            categories = request.categories.len(),
            icons = icons.len(),
            "saving snapshot"
        );

        self.write_all(timestamp, &links, &request.categories, &settings, &icons)
            .await?;
        Ok(timestamp)
    }

    async fn initialize(&self) -> Snapshot {
        let timestamp = crate::now_millis();
        let links = defaults::links(timestamp);
        let categories = defaults::categories();
        let settings = defaults::initial_settings();

        tracing::info!("no snapshot stored yet, writing defaults");
        if let Err(e) = self
            .write_all(timestamp, &links, &categories, &settings, &IconMap::new())
            .await
        {
            tracing::error!("failed to initialize default data: {}", crate::unpack_error(&e));
        }

        Snapshot {
            links,
            categories,
            settings,
            timestamp,
        }
    }

    async fn write_all(
        &self,
        timestamp: i64,
        links: &[Link],
        categories: &[Category],
        settings: &SiteSettings,
        icons: &IconMap,
    ) -> Result<(), StorageError> {
        let links = to_json(LINKS_KEY, links)?;
        let categories = to_json(CATEGORIES_KEY, categories)?;
        let settings = to_json(SETTINGS_KEY, settings)?;
        let icons = to_json(ICONS_KEY, icons)?;

        tokio::try_join!(
            self.kv.put(TIMESTAMP_KEY, timestamp.to_string()),
            self.kv.put(LINKS_KEY, links),
            self.kv.put(CATEGORIES_KEY, categories),
            self.kv.put(SETTINGS_KEY, settings),
            self.kv.put(ICONS_KEY, icons),
        )?;
        Ok(())
    }

    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.kv.get(key).await? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() || raw.trim() == "null" => Ok(None),
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| StorageError::Corrupt(key.to_string(), e)),
        }
    }
}

fn to_json<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(|e| StorageError::Corrupt(key.to_string(), e))
}
