// ABOUTME: Shared test utilities for integration tests
// ABOUTME: Stub platform server recording requests, logging setup and configuration builders
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::too_many_lines,
    clippy::unwrap_used,
    clippy::significant_drop_tightening
)]
//! Shared test utilities for `tiktok_studio`
//!
//! The stub platform answers every endpoint the crate calls. Its behaviour
//! can be changed per test through [`StubBehavior`], and every request it
//! receives is recorded for assertions.

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::{json, Value};
use std::io::Write;
use std::sync::{Arc, Mutex, Once};
use tempfile::NamedTempFile;
use tiktok_studio::{
    config::ServerConfig,
    credentials::Credential,
    oauth2_client::TokenGrant,
};
use tokio::net::TcpListener;

static INIT_LOGGER: Once = Once::new();

/// Publish id handed out by the stub's init endpoints
pub const STUB_PUBLISH_ID: &str = "v_pub_file~v2-1.7534632449491552261";
/// Video id embedded in [`STUB_PUBLISH_ID`]
pub const STUB_VIDEO_ID: &str = "7534632449491552261";
/// Open id returned by the stub token endpoint
pub const STUB_OPEN_ID: &str = "open-1";
/// Access token returned by the stub token endpoint
pub const STUB_ACCESS_TOKEN: &str = "act.stub-token";

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// One request received by the stub
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RecordedRequest {
    /// Header value as a string
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    }

    /// Body decoded as JSON
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    /// Body decoded as a urlencoded form
    pub fn form(&self) -> Vec<(String, String)> {
        url::form_urlencoded::parse(&self.body)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    /// One form value
    pub fn form_value(&self, key: &str) -> Option<String> {
        self.form().into_iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

/// Per-endpoint answers of the stub
#[derive(Debug, Clone)]
pub struct StubBehavior {
    pub token_status: u16,
    pub token_body: Value,
    pub user_status: u16,
    pub user_body: Value,
    pub stats_status: u16,
    pub creator_status: u16,
    pub creator_body: Value,
    pub init_status: u16,
    /// `None` answers with a publish id and an upload URL pointing at the stub
    pub init_body: Option<Value>,
    /// 0-based chunk index that fails
    pub chunk_fail_at: Option<usize>,
    pub chunk_status: u16,
    pub status_status: u16,
    pub list_status: u16,
    pub videos: Vec<Value>,
    pub query_status: u16,
}

impl Default for StubBehavior {
    fn default() -> Self {
        Self {
            token_status: 200,
            token_body: json!({
                "access_token": STUB_ACCESS_TOKEN,
                "open_id": STUB_OPEN_ID,
                "expires_in": 86400,
                "refresh_token": "rft.stub",
                "scope": "user.info.basic,video.upload"
            }),
            user_status: 200,
            user_body: json!({
                "data": { "user": {
                    "open_id": STUB_OPEN_ID,
                    "display_name": "Stub Creator",
                    "avatar_url": "https://cdn.example.com/avatar.jpg",
                    "is_verified": false
                }},
                "error": { "code": "ok", "message": "" }
            }),
            stats_status: 200,
            creator_status: 200,
            creator_body: json!({
                "data": {
                    "creator_username": "stubcreator",
                    "creator_nickname": "Stub Creator",
                    "privacy_level_options": ["FOLLOWER_OF_CREATOR", "SELF_ONLY"]
                },
                "error": { "code": "ok", "message": "" }
            }),
            init_status: 200,
            init_body: None,
            chunk_fail_at: None,
            chunk_status: 201,
            status_status: 200,
            list_status: 200,
            videos: Vec::new(),
            query_status: 200,
        }
    }
}

/// Shared state of a running stub
#[derive(Debug, Default)]
pub struct StubState {
    pub base_url: String,
    pub behavior: Mutex<StubBehavior>,
    pub requests: Mutex<Vec<RecordedRequest>>,
}

/// A stub of the platform listening on `127.0.0.1`
pub struct StubPlatform {
    pub base_url: String,
    pub state: Arc<StubState>,
}

impl StubPlatform {
    /// Start a stub with default behaviour
    pub async fn start() -> Result<Self> {
        Self::start_with(StubBehavior::default()).await
    }

    /// Start a stub with `behavior`
    pub async fn start_with(behavior: StubBehavior) -> Result<Self> {
        init_test_logging();
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let base_url = format!("http://{}", listener.local_addr()?);
        let state = Arc::new(StubState {
            base_url: base_url.clone(),
            behavior: Mutex::new(behavior),
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .fallback(handle_stub_request)
            .layer(DefaultBodyLimit::disable())
            .with_state(Arc::clone(&state));
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { base_url, state })
    }

    /// Change the behaviour in place
    pub fn configure(&self, update: impl FnOnce(&mut StubBehavior)) {
        update(&mut self.state.behavior.lock().unwrap());
    }

    /// All recorded requests
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Recorded requests whose path equals `path`
    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }

    /// Number of requests whose path equals `path`
    pub fn count(&self, path: &str) -> usize {
        self.requests_to(path).len()
    }
}

async fn handle_stub_request(
    State(state): State<Arc<StubState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_owned();
    let query = uri.query().map(str::to_owned);
    let request = RecordedRequest {
        method,
        path: path.clone(),
        query: query.clone(),
        headers,
        body,
    };

    let chunk_index = {
        let mut requests = state.requests.lock().unwrap();
        let index = requests.iter().filter(|r| r.path == "/upload").count();
        requests.push(request.clone());
        index
    };
    let behavior = state.behavior.lock().unwrap().clone();
    let fields = query.unwrap_or_default();

    match path.as_str() {
        "/v2/oauth/token/" => reply(behavior.token_status, behavior.token_body),
        "/v2/user/info/" if fields.contains("display_name") => {
            reply(behavior.user_status, behavior.user_body)
        }
        "/v2/user/info/" => reply(
            behavior.stats_status,
            json!({ "data": { "user": {
                "follower_count": 120,
                "following_count": 7,
                "video_count": 3,
                "likes_count": 950
            }}}),
        ),
        "/v2/post/publish/creator_info/query/" => {
            reply(behavior.creator_status, behavior.creator_body)
        }
        "/v2/post/publish/video/init/" | "/v2/post/publish/inbox/video/init/" => {
            let body = behavior.init_body.unwrap_or_else(|| {
                json!({
                    "data": {
                        "publish_id": STUB_PUBLISH_ID,
                        "upload_url": format!("{}/upload", state.base_url)
                    },
                    "error": { "code": "ok", "message": "" }
                })
            });
            reply(behavior.init_status, body)
        }
        "/upload" => {
            if behavior.chunk_fail_at == Some(chunk_index) {
                reply(500, json!({ "error": "chunk rejected" }))
            } else {
                reply(behavior.chunk_status, json!({}))
            }
        }
        "/v2/post/publish/status/fetch/" => reply(
            behavior.status_status,
            json!({ "data": { "status": "PROCESSING_UPLOAD", "uploaded_bytes": 0 } }),
        ),
        "/v2/video/list/" => reply(
            behavior.list_status,
            json!({ "data": { "videos": behavior.videos, "cursor": 0, "has_more": false } }),
        ),
        "/v2/video/query/" => {
            let ids: Vec<String> = request.json()["filters"]["video_ids"]
                .as_array()
                .map(|a| a.iter().filter_map(|v| v.as_str().map(str::to_owned)).collect())
                .unwrap_or_default();
            let details: Vec<Value> = ids
                .iter()
                .map(|id| json!({ "id": id, "view_count": 1000, "like_count": 50, "duration": 15 }))
                .collect();
            reply(behavior.query_status, json!({ "data": { "videos": details } }))
        }
        _ => reply(404, json!({ "error": "not found" })),
    }
}

fn reply(status: u16, body: Value) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(body)).into_response()
}

/// Configuration pointing every platform URL at `base_url`, without settle delay
pub fn test_config(base_url: &str) -> ServerConfig {
    let mut config = ServerConfig::with_credentials("test-client-key", "test-client-secret");
    config.platform.api_base_url = base_url.to_owned();
    config.upload.status_settle_delay_secs = 0;
    config
}

/// Credential as if a login had completed
pub fn test_credential(open_id: &str) -> Credential {
    let grant = TokenGrant {
        access_token: format!("act.{open_id}"),
        open_id: open_id.to_owned(),
        refresh_token: None,
        expires_in: Some(86400),
        scope: None,
    };
    Credential::from_grant(&grant, Some(format!("User {open_id}")), None, 300)
}

/// Temporary video file of `size` bytes with a repeating byte pattern
pub fn video_file(size: usize) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    let data: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
    file.write_all(&data)?;
    file.flush()?;
    Ok(file)
}
