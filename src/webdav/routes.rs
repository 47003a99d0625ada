use axum::{Router, routing::post};

use super::handler;
use crate::handler::{AppState, preflight};

pub fn routes() -> Router<AppState> {
    Router::new().route("/webdav", post(handler::webdav).options(preflight))
}
