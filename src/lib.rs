use axum::{
    Router,
    http::{HeaderName, Method, header},
    middleware,
    routing::get,
};
use std::error::Error;
use tower_http::cors::{Any, CorsLayer};

use crate::handler::{AppState, healthcheck, preflight_no_content};

pub mod api;
pub mod client;
pub mod config;
pub mod defaults;
pub mod error;
pub mod handler;
pub mod icon;
pub mod kv;
pub mod model;
pub mod storage;
pub mod webdav;

pub const AUTH_HEADER: &str = "x-auth-password";

pub fn unpack_error(err: &dyn Error) -> String {
    let mut parts = Vec::new();
    parts.push(err.to_string());
    let mut current = err.source();
    while let Some(source) = current {
        parts.push(source.to_string());
        current = source.source();
    }
    parts.join(": ")
}

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(AUTH_HEADER)])
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .merge(storage::routes())
        .merge(icon::routes())
        .merge(webdav::routes());

    Router::new()
        .route("/", get(healthcheck))
        .nest("/api", api)
        .layer(cors_layer())
        .layer(middleware::from_fn(preflight_no_content))
        .with_state(state)
}
