//! Client Data Layer
//!
//! Talks to a running cloudnav service the way the dashboard does: load the
//! snapshot once, edit a [`Dashboard`] in memory, push the whole state back
//! after every change.
//!
//! # Usage
//!
//! ```rust,ignore
//! use cloudnav::client::{DashboardClient, IconStrategy, LinkDraft};
//!
//! let client = DashboardClient::new("http://localhost:8788", Some("secret".into()));
//! let mut dashboard = client.load().await?;
//! let id = client
//!     .save_link(&mut dashboard, draft, IconStrategy::SaveThenConvert)
//!     .await?;
//! ```

pub mod ai;
pub mod dashboard;

pub use ai::{AiAssistant, AiError, AiSuggestion};
pub use dashboard::{CategoryDraft, Dashboard, DashboardError, LinkDraft};

use reqwest::{StatusCode, Url};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::api::{ErrorResponse, IconResponse, SaveResponse, SuccessResponse};
use crate::handler::outbound_client;
use crate::icon::{fetch_data_url, parse_icon_url};
use crate::model::{BackupPayload, Snapshot, WebDavConfig, is_embedded_image};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("wrong or missing password")]
    Unauthorized,
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("invalid response: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Dashboard(#[from] DashboardError),
    #[error("icon conversion failed: {0}")]
    Icon(String),
}

/// When a link's remote icon gets turned into an embedded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconStrategy {
    /// Save with the raw icon URL, then convert and save again. A failed
    /// conversion or second save is logged and leaves the raw URL in place.
    SaveThenConvert,
    /// Convert before the only save. A failed conversion drops the icon.
    ConvertFirst,
}

/// Favicon service URL for a site, accepting bare host names.
pub fn favicon_url(site: &str) -> Option<String> {
    let site = site.trim();
    if site.is_empty() {
        return None;
    }
    let normalized = if site.starts_with("http") {
        site.to_string()
    } else {
        format!("https://{}", site)
    };
    let url = Url::parse(&normalized).ok()?;
    let host = url.host_str()?;
    Some(format!("https://favicon.im/zh/{}/?larger=true", host))
}

pub struct DashboardClient {
    http: reqwest::Client,
    base_url: String,
    password: Option<String>,
}

impl DashboardClient {
    pub fn new(base_url: &str, password: Option<String>) -> Self {
        Self {
            http: outbound_client(),
            base_url: base_url.trim_end_matches('/').to_string(),
            password,
        }
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    pub async fn load(&self) -> Result<Dashboard, ClientError> {
        let response = self.http.get(self.endpoint("storage")).send().await?;
        let snapshot: Snapshot = read_body(response).await?;
        tracing::debug!(
            links = snapshot.links.len(),
            timestamp = snapshot.timestamp,
            "loaded snapshot"
        );
        Ok(snapshot.into())
    }

    /// Pushes the full dashboard state and records the server's timestamp.
    pub async fn save(&self, dashboard: &mut Dashboard) -> Result<i64, ClientError> {
        let mut request = self
            .http
            .post(self.endpoint("storage"))
            .json(&dashboard.to_save_request());
        if let Some(password) = &self.password {
            request = request.header(crate::AUTH_HEADER, password);
        }
        let saved: SaveResponse = read_body(request.send().await?).await?;
        dashboard.timestamp = saved.timestamp;
        Ok(saved.timestamp)
    }

    /// Embedded images and non-http values are returned as they are. Remote
    /// icons go through the service proxy first, then a direct fetch.
    pub async fn convert_icon(&self, icon: &str) -> Result<String, ClientError> {
        if is_embedded_image(icon) || !(icon.starts_with("http://") || icon.starts_with("https://")) {
            return Ok(icon.to_string());
        }

        match self.convert_via_proxy(icon).await {
            Ok(data_url) => return Ok(data_url),
            Err(e) => tracing::warn!("icon proxy failed for {}: {}, fetching directly", icon, e),
        }

        let url = parse_icon_url(icon).map_err(|e| ClientError::Icon(e.to_string()))?;
        fetch_data_url(&self.http, url)
            .await
            .map_err(|e| ClientError::Icon(e.to_string()))
    }

    async fn convert_via_proxy(&self, icon: &str) -> Result<String, ClientError> {
        let url = format!("{}?url={}", self.endpoint("icon"), urlencoding::encode(icon));
        let response: IconResponse = read_body(self.http.get(url).send().await?).await?;
        Ok(response.data_url)
    }

    /// Adds a link, handling its icon per `strategy`, and returns its id.
    pub async fn save_link(
        &self,
        dashboard: &mut Dashboard,
        mut draft: LinkDraft,
        strategy: IconStrategy,
    ) -> Result<String, ClientError> {
        let pending = self.prepare_icon(&mut draft, strategy).await;
        let id = dashboard.add_link(draft, crate::now_millis());
        self.save(dashboard).await?;

        if let Some(icon) = pending {
            self.embed_icon_later(dashboard, &id, &icon).await;
        }
        Ok(id)
    }

    /// Edits an existing link with the same icon handling as [`Self::save_link`].
    /// Pin state follows `draft.pinned`; an already pinned link keeps its order.
    /// Under `ConvertFirst` a failed conversion keeps the link's previous icon.
    pub async fn update_link(
        &self,
        dashboard: &mut Dashboard,
        id: &str,
        mut draft: LinkDraft,
        strategy: IconStrategy,
    ) -> Result<(), ClientError> {
        let pending = self.prepare_icon(&mut draft, strategy).await;
        dashboard.update_link(id, draft)?;
        self.save(dashboard).await?;

        if let Some(icon) = pending {
            self.embed_icon_later(dashboard, id, &icon).await;
        }
        Ok(())
    }

    /// Converts the draft's icon up front for `ConvertFirst`. For
    /// `SaveThenConvert` returns the remote icon still to be embedded.
    async fn prepare_icon(&self, draft: &mut LinkDraft, strategy: IconStrategy) -> Option<String> {
        let raw_icon = draft.icon.clone().filter(|i| !i.trim().is_empty())?;
        match strategy {
            IconStrategy::ConvertFirst => {
                draft.icon = match self.convert_icon(&raw_icon).await {
                    Ok(converted) => Some(converted),
                    Err(e) => {
                        tracing::warn!("dropping icon {}: {}", raw_icon, e);
                        None
                    }
                };
                None
            }
            IconStrategy::SaveThenConvert => Some(raw_icon).filter(|i| !is_embedded_image(i)),
        }
    }

    async fn embed_icon_later(&self, dashboard: &mut Dashboard, id: &str, icon: &str) {
        let converted = match self.convert_icon(icon).await {
            Ok(converted) if converted != icon => converted,
            Ok(_) => return,
            Err(e) => {
                tracing::warn!("icon conversion for link {} failed: {}", id, e);
                return;
            }
        };
        if let Err(e) = dashboard.set_link_icon(id, Some(converted)) {
            tracing::warn!("link {} vanished before its icon was embedded: {}", id, e);
            return;
        }
        if let Err(e) = self.save(dashboard).await {
            tracing::warn!("saving embedded icon for link {} failed: {}", id, e);
        }
    }

    async fn webdav_call<T: Serialize>(
        &self,
        operation: &str,
        config: &WebDavConfig,
        payload: Option<T>,
    ) -> Result<reqwest::Response, ClientError> {
        let body = serde_json::json!({
            "operation": operation,
            "config": config,
            "payload": payload,
        });
        Ok(self.http.post(self.endpoint("webdav")).json(&body).send().await?)
    }

    pub async fn webdav_check(&self, config: &WebDavConfig) -> Result<bool, ClientError> {
        let response = self.webdav_call::<()>("check", config, None).await?;
        let result: SuccessResponse = read_body(response).await?;
        Ok(result.success)
    }

    pub async fn webdav_backup(&self, config: &WebDavConfig, dashboard: &Dashboard) -> Result<bool, ClientError> {
        let response = self
            .webdav_call("upload", config, Some(dashboard.backup_payload()))
            .await?;
        let result: SuccessResponse = read_body(response).await?;
        Ok(result.success)
    }

    /// The stored backup, or `None` when the server has none yet.
    pub async fn webdav_restore(&self, config: &WebDavConfig) -> Result<Option<BackupPayload>, ClientError> {
        let response = self.webdav_call::<()>("download", config, None).await?;
        let value: Value = read_body(response).await?;
        if value.is_null() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(value)?))
    }
}

async fn read_body<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    let bytes = response.bytes().await?;
    if status == StatusCode::UNAUTHORIZED {
        return Err(ClientError::Unauthorized);
    }
    if !status.is_success() {
        let message = serde_json::from_slice::<ErrorResponse>(&bytes)
            .map(|e| e.error)
            .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned());
        return Err(ClientError::Status {
            status: status.as_u16(),
            message,
        });
    }
    Ok(serde_json::from_slice(&bytes)?)
}
