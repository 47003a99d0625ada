use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use sha2::{Digest, Sha256};

use super::SnapshotStore;
use crate::api::{ErrorResponse, SaveResponse, error_response};
use crate::handler::AppState;
use crate::model::SaveRequest;

fn kv_unavailable() -> Response {
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorResponse::new("KV storage not available"),
    )
}

/// Compares fixed-length digests of both secrets, never the raw strings.
fn password_matches(provided: Option<&str>, expected: &str) -> bool {
    match provided {
        Some(provided) => Sha256::digest(provided.as_bytes()) == Sha256::digest(expected.as_bytes()),
        None => false,
    }
}

pub async fn get_snapshot(State(state): State<AppState>) -> Response {
    let Some(kv) = state.kv.as_deref() else {
        tracing::error!("storage read requested but no kv backend is configured");
        return kv_unavailable();
    };

    match SnapshotStore::new(kv).load().await {
        Ok(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        Err(e) => {
            let details = crate::unpack_error(&e);
            tracing::error!("failed to fetch data: {}", details);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::with_details("Failed to fetch data", details),
            )
        }
    }
}

pub async fn save_snapshot(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let Some(server_password) = state.password.as_deref() else {
        tracing::error!("rejecting save: no password configured");
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorResponse::new("Server misconfigured: PASSWORD not set"),
        );
    };

    let provided = headers
        .get(crate::AUTH_HEADER)
        .and_then(|v| v.to_str().ok());
    if !password_matches(provided, server_password) {
        tracing::warn!("rejecting save: bad or missing {}", crate::AUTH_HEADER);
        return error_response(StatusCode::UNAUTHORIZED, ErrorResponse::new("Unauthorized"));
    }

    let request: SaveRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                ErrorResponse::with_details("Invalid request body", e.to_string()),
            );
        }
    };

    let Some(kv) = state.kv.as_deref() else {
        return kv_unavailable();
    };

    match SnapshotStore::new(kv).save(request, crate::now_millis()).await {
        Ok(timestamp) => {
            tracing::info!(timestamp, "snapshot saved");
            (
                StatusCode::OK,
                Json(SaveResponse {
                    success: true,
                    timestamp,
                }),
            )
                .into_response()
        }
        Err(e) => {
            let details = crate::unpack_error(&e);
            tracing::error!("failed to save data: {}", details);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::with_details("Failed to save data", details),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_must_match_exactly() {
        assert!(password_matches(Some("s3cret"), "s3cret"));
        assert!(!password_matches(Some("s3cret "), "s3cret"));
        assert!(!password_matches(Some(""), "s3cret"));
        assert!(!password_matches(None, "s3cret"));
    }
}
