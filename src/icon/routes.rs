use axum::{Router, routing::get};

use super::handler;
use crate::handler::{AppState, preflight};

pub fn routes() -> Router<AppState> {
    Router::new().route("/icon", get(handler::proxy_icon).options(preflight))
}
