use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::Value;

use super::client::WebDavClient;
use crate::api::{ErrorResponse, SuccessResponse, error_response};
use crate::error::WebDavError;
use crate::handler::AppState;
use crate::model::WebDavConfig;

#[derive(Debug, Deserialize)]
pub struct WebDavRequest {
    pub operation: String,
    pub config: WebDavConfig,
    #[serde(default)]
    pub payload: Option<Value>,
}

fn success(ok: bool) -> Response {
    (StatusCode::OK, Json(SuccessResponse { success: ok })).into_response()
}

pub async fn webdav(State(state): State<AppState>, body: Bytes) -> Response {
    let request: WebDavRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                ErrorResponse::with_details("Invalid request body", e.to_string()),
            );
        }
    };

    let client = WebDavClient::new(state.http.clone(), &request.config);

    match request.operation.as_str() {
        "check" => match client.check().await {
            Ok(ok) => success(ok),
            Err(e) => {
                tracing::warn!("webdav check failed: {}", crate::unpack_error(&e));
                success(false)
            }
        },
        "upload" => {
            let Some(payload) = request.payload else {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new("payload is required for upload"),
                );
            };
            match client.upload(&payload).await {
                Ok(ok) => success(ok),
                Err(e) => {
                    tracing::warn!("webdav upload failed: {}", crate::unpack_error(&e));
                    success(false)
                }
            }
        }
        "download" => match client.download().await {
            Ok(Some(backup)) => (StatusCode::OK, Json(backup)).into_response(),
            Ok(None) => (StatusCode::OK, Json(Value::Null)).into_response(),
            Err(WebDavError::Status(status)) => {
                tracing::warn!("webdav download returned {}", status);
                let status = StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
                error_response(status, ErrorResponse::new("Failed to download backup"))
            }
            Err(e) => {
                let details = crate::unpack_error(&e);
                tracing::error!("webdav download failed: {}", details);
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::with_details("Failed to process WebDAV request", details),
                )
            }
        },
        other => {
            tracing::warn!("unknown webdav operation {:?}", other);
            error_response(StatusCode::BAD_REQUEST, ErrorResponse::new("Invalid operation"))
        }
    }
}
