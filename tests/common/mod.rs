#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    body::{Body, Bytes},
    extract::{Path, State},
    http::{HeaderMap, Method, Request, StatusCode, Uri, header},
    response::{IntoResponse, Response},
    routing::{get as route_get, post},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde_json::{Value, json};
use tower::ServiceExt;

use cloudnav::handler::AppState;
use cloudnav::kv::{KvStore, MemoryKv};

pub const PASSWORD: &str = "correct horse";

/// A 1x1 transparent PNG.
pub const PNG: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f, 0x15, 0xc4,
    0x89, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0d, 0x0a, 0x2d, 0xb4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4e, 0x44, 0xae,
    0x42, 0x60, 0x82,
];

pub async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

pub fn memory_state(password: Option<&str>) -> (AppState, Arc<KvStore>) {
    let kv = Arc::new(KvStore::Memory(MemoryKv::new()));
    let state = AppState::new(Some(kv.clone()), password.map(str::to_string));
    (state, kv)
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, password: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(password) = password {
        builder = builder.header(cloudnav::AUTH_HEADER, password);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

// ─── Favicon host ───

pub fn icon_host() -> Router {
    Router::new()
        .route(
            "/favicon.png",
            route_get(|| async { ([(header::CONTENT_TYPE, "image/png")], PNG) }),
        )
        .route(
            "/raw.ico",
            route_get(|| async { Response::builder().body(Body::from(PNG)).unwrap() }),
        )
        .route(
            "/zh/example.com/",
            route_get(|| async { Response::builder().body(Body::from(PNG)).unwrap() }),
        )
        .route("/missing.png", route_get(|| async { StatusCode::NOT_FOUND }))
}

// ─── WebDAV server ───

#[derive(Clone, Default)]
pub struct MockDav {
    pub files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    pub dirs: Arc<Mutex<HashSet<String>>>,
    pub username: String,
    pub password: String,
}

impl MockDav {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            ..Default::default()
        }
    }

    pub fn router(&self) -> Router {
        Router::new().fallback(dav_handler).with_state(self.clone())
    }
}

async fn dav_handler(State(dav): State<MockDav>, method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Response {
    let expected = format!(
        "Basic {}",
        BASE64.encode(format!("{}:{}", dav.username, dav.password))
    );
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == expected);
    if !authorized {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let path = uri.path().to_string();
    match method.as_str() {
        "PROPFIND" => {
            if path == "/dav/" || dav.dirs.lock().unwrap().contains(&path) {
                StatusCode::MULTI_STATUS.into_response()
            } else {
                StatusCode::NOT_FOUND.into_response()
            }
        }
        "MKCOL" => {
            dav.dirs.lock().unwrap().insert(path);
            StatusCode::CREATED.into_response()
        }
        "PUT" => {
            let parent = format!("{}/", path.rsplit_once('/').map(|(p, _)| p).unwrap_or(""));
            if !dav.dirs.lock().unwrap().contains(&parent) {
                return StatusCode::CONFLICT.into_response();
            }
            dav.files.lock().unwrap().insert(path, body.to_vec());
            StatusCode::CREATED.into_response()
        }
        "GET" => match dav.files.lock().unwrap().get(&path) {
            Some(bytes) => bytes.clone().into_response(),
            None => StatusCode::NOT_FOUND.into_response(),
        },
        _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}

// ─── KV HTTP API ───

#[derive(Clone, Default)]
pub struct MockKvApi {
    pub values: Arc<Mutex<HashMap<String, String>>>,
}

impl MockKvApi {
    pub fn router(&self, token: &str) -> Router {
        let token = format!("Bearer {}", token);
        Router::new()
            .route(
                "/kv/:key",
                route_get({
                    let token = token.clone();
                    move |State(api): State<MockKvApi>, Path(key): Path<String>, headers: HeaderMap| async move {
                        if !bearer_ok(&headers, &token) {
                            return StatusCode::UNAUTHORIZED.into_response();
                        }
                        match api.values.lock().unwrap().get(&key) {
                            Some(value) => Json(json!({ "value": value })).into_response(),
                            None => StatusCode::NOT_FOUND.into_response(),
                        }
                    }
                })
                .put({
                    let token = token.clone();
                    move |State(api): State<MockKvApi>,
                          Path(key): Path<String>,
                          headers: HeaderMap,
                          Json(body): Json<Value>| async move {
                        if !bearer_ok(&headers, &token) {
                            return StatusCode::UNAUTHORIZED.into_response();
                        }
                        let value = body["value"].as_str().unwrap_or_default().to_string();
                        api.values.lock().unwrap().insert(key, value);
                        StatusCode::NO_CONTENT.into_response()
                    }
                }),
            )
            .with_state(self.clone())
    }
}

fn bearer_ok(headers: &HeaderMap, expected: &str) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == expected)
}

// ─── AI providers ───

fn reply_for(prompt: &str) -> &'static str {
    if prompt.contains("category") {
        "dev"
    } else {
        "A home for open source code."
    }
}

pub fn ai_provider() -> Router {
    Router::new()
        .route(
            "/v1beta/models/:model",
            post(|Json(body): Json<Value>| async move {
                let prompt = body
                    .pointer("/contents/0/parts/0/text")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                Json(json!({
                    "candidates": [{ "content": { "parts": [{ "text": reply_for(prompt) }] } }]
                }))
            }),
        )
        .route(
            "/v1/chat/completions",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                if !bearer_ok(&headers, "Bearer sk-test") {
                    return StatusCode::UNAUTHORIZED.into_response();
                }
                let prompt = body
                    .pointer("/messages/0/content")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                Json(json!({
                    "choices": [{ "message": { "role": "assistant", "content": reply_for(prompt) } }]
                }))
                .into_response()
            }),
        )
}
