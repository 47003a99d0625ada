use axum::{Router, routing::get};

use super::handler;
use crate::handler::{AppState, preflight};

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/storage",
        get(handler::get_snapshot)
            .post(handler::save_snapshot)
            .options(preflight),
    )
}
