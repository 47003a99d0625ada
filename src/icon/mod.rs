//! Icon Proxy Module
//!
//! Fetches a remote icon server-side and hands it back as a `data:` URL, so the
//! dashboard can embed favicons from hosts that do not allow cross-origin reads.

mod handler;
mod routes;

pub use routes::routes;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use reqwest::Url;

use crate::error::IconError;

const FALLBACK_MIME: &str = "image/png";

pub fn parse_icon_url(raw: &str) -> Result<Url, IconError> {
    let url = Url::parse(raw.trim()).map_err(|e| IconError::InvalidUrl(format!("{}: {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(IconError::InvalidUrl(format!("unsupported scheme {}", other))),
    }
}

/// Downloads `url` and encodes the body as a base64 data URL.
pub async fn fetch_data_url(http: &reqwest::Client, url: Url) -> Result<String, IconError> {
    let response = http.get(url.clone()).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(IconError::Upstream(status));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = response.bytes().await?;

    let mime = detect_mime(content_type.as_deref(), &url);
    tracing::debug!(url = %url, mime = %mime, bytes = bytes.len(), "converted icon");
    Ok(to_data_url(&mime, &bytes))
}

pub fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, BASE64.encode(bytes))
}

/// Upstream content type without parameters; when absent or generic, an image
/// type guessed from the URL path; otherwise `image/png`.
pub fn detect_mime(content_type: Option<&str>, url: &Url) -> String {
    let declared = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase())
        .filter(|ct| !ct.is_empty() && ct != "application/octet-stream");

    if let Some(mime) = declared {
        return mime;
    }

    guess_image_mime(url.path()).unwrap_or_else(|| FALLBACK_MIME.to_string())
}

/// An `image/*` type guessed from the file extension. Directory-style paths
/// such as `/zh/github.com/` carry a host name, not a file name.
fn guess_image_mime(path: &str) -> Option<String> {
    if path.is_empty() || path.ends_with('/') {
        return None;
    }
    mime_guess::from_path(path)
        .iter()
        .find(|m| m.type_() == mime_guess::mime::IMAGE)
        .map(|m| m.essence_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn declared_content_type_wins() {
        let u = url("https://example.com/favicon.ico");
        assert_eq!(detect_mime(Some("image/svg+xml; charset=utf-8"), &u), "image/svg+xml");
    }

    #[test]
    fn guesses_from_path_when_generic() {
        let u = url("https://example.com/static/logo.jpg");
        assert_eq!(detect_mime(Some("application/octet-stream"), &u), "image/jpeg");
        assert_eq!(detect_mime(None, &u), "image/jpeg");
    }

    #[test]
    fn falls_back_to_png() {
        let u = url("https://favicon.im/zh/github.com/?larger=true");
        assert_eq!(detect_mime(None, &u), "image/png");
        assert_eq!(detect_mime(Some("application/octet-stream"), &u), "image/png");
    }

    #[test]
    fn ignores_non_image_guesses() {
        assert_eq!(detect_mime(None, &url("https://example.com/icons/github.com")), "image/png");
        assert_eq!(detect_mime(None, &url("https://example.com/favicon.json")), "image/png");
        assert!(detect_mime(None, &url("https://example.com/favicon.ico")).starts_with("image/"));
    }

    #[test]
    fn encodes_data_url() {
        assert_eq!(to_data_url("image/png", b"hi"), "data:image/png;base64,aGk=");
    }

    #[test]
    fn rejects_non_http_urls() {
        assert!(parse_icon_url("ftp://example.com/a.png").is_err());
        assert!(parse_icon_url("not a url").is_err());
        assert!(parse_icon_url(" https://example.com/a.png ").is_ok());
    }
}
