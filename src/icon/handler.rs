use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use super::{fetch_data_url, parse_icon_url};
use crate::api::{ErrorResponse, IconResponse, error_response};
use crate::error::IconError;
use crate::handler::AppState;

#[derive(Debug, Deserialize)]
pub struct IconQuery {
    pub url: Option<String>,
}

pub async fn proxy_icon(State(state): State<AppState>, Query(query): Query<IconQuery>) -> Response {
    let Some(raw) = query.url.filter(|u| !u.trim().is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, ErrorResponse::new("URL parameter is required"));
    };

    let url = match parse_icon_url(&raw) {
        Ok(url) => url,
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                ErrorResponse::with_details("Invalid URL", e.to_string()),
            );
        }
    };

    match fetch_data_url(&state.http, url).await {
        Ok(data_url) => (StatusCode::OK, Json(IconResponse { data_url })).into_response(),
        Err(IconError::Upstream(status)) => {
            tracing::warn!("icon fetch for {} returned {}", raw, status);
            let status = StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
            error_response(status, ErrorResponse::new("Failed to fetch icon"))
        }
        Err(e) => {
            let details = crate::unpack_error(&e);
            tracing::error!("failed to process icon {}: {}", raw, details);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::with_details("Failed to process icon", details),
            )
        }
    }
}
