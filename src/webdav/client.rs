use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::Value;

use crate::error::WebDavError;
use crate::model::WebDavConfig;

pub const BACKUP_DIR: &str = "cloudnav/";
pub const BACKUP_FILE: &str = "backup.json";

/// Minimal WebDAV client for the single backup file the dashboard keeps.
pub struct WebDavClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
}

fn dav_method(name: &str) -> Result<Method, WebDavError> {
    Method::from_bytes(name.as_bytes()).map_err(|_| WebDavError::Method(name.to_string()))
}

pub fn normalize_base_url(url: &str) -> String {
    let url = url.trim();
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    }
}

impl WebDavClient {
    pub fn new(http: reqwest::Client, config: &WebDavConfig) -> Self {
        Self {
            http,
            base_url: normalize_base_url(&config.url),
            username: config.username.clone(),
            password: config.password.clone(),
        }
    }

    pub fn directory_url(&self) -> String {
        format!("{}{}", self.base_url, BACKUP_DIR)
    }

    pub fn file_url(&self) -> String {
        format!("{}{}", self.directory_url(), BACKUP_FILE)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .basic_auth(&self.username, Some(&self.password))
    }

    async fn propfind(&self, url: &str) -> Result<StatusCode, WebDavError> {
        let response = self
            .request(dav_method("PROPFIND")?, url)
            .header("Depth", "0")
            .send()
            .await?;
        Ok(response.status())
    }

    /// True when the server answers a depth-0 PROPFIND on the base URL.
    pub async fn check(&self) -> Result<bool, WebDavError> {
        let status = self.propfind(&self.base_url).await?;
        tracing::debug!("webdav check against {} returned {}", self.base_url, status);
        Ok(status.is_success())
    }

    pub async fn ensure_directory(&self) -> Result<(), WebDavError> {
        let dir = self.directory_url();
        if self.propfind(&dir).await? != StatusCode::NOT_FOUND {
            return Ok(());
        }

        tracing::info!("creating webdav directory {}", dir);
        let response = self.request(dav_method("MKCOL")?, &dir).send().await?;
        if !response.status().is_success() {
            return Err(WebDavError::CreateDirectory(dir, response.status()));
        }
        Ok(())
    }

    pub async fn upload(&self, payload: &Value) -> Result<bool, WebDavError> {
        self.ensure_directory().await?;

        let body = serde_json::to_string_pretty(payload)?;
        let response = self
            .request(Method::PUT, &self.file_url())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::warn!("webdav upload returned {}", response.status());
        }
        Ok(response.status().is_success())
    }

    /// The stored backup, or `None` when the file does not exist.
    pub async fn download(&self) -> Result<Option<Value>, WebDavError> {
        let response = self.request(Method::GET, &self.file_url()).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let bytes = response.bytes().await?;
                Ok(Some(serde_json::from_slice(&bytes)?))
            }
            status => Err(WebDavError::Status(status)),
        }
    }
}
