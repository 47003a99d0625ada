use std::sync::Arc;

use axum::{
    Json,
    extract::Request,
    http::{Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use tracing::info;

use crate::api::StatusResponse;
use crate::kv::KvStore;

/// Browser-like user agent for outbound fetches; some favicon hosts refuse bare clients.
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

#[derive(Clone)]
pub struct AppState {
    pub kv: Option<Arc<KvStore>>,
    pub password: Option<String>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(kv: Option<Arc<KvStore>>, password: Option<String>) -> Self {
        Self {
            kv,
            password: password.filter(|p| !p.is_empty()),
            http: outbound_client(),
        }
    }
}

pub fn outbound_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(BROWSER_USER_AGENT)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!("failed to build http client with user agent: {}", e);
            reqwest::Client::new()
        })
}

pub async fn healthcheck() -> impl IntoResponse {
    info!("got healthcheck request");
    Json(StatusResponse {
        status: "ok".to_string(),
    })
}

pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// The CORS layer answers preflights itself with 200; clients expect 204.
pub async fn preflight_no_content(req: Request, next: Next) -> Response {
    let is_options = req.method() == Method::OPTIONS;
    let mut response = next.run(req).await;
    if is_options && response.status() == StatusCode::OK {
        *response.status_mut() = StatusCode::NO_CONTENT;
    }
    response
}
