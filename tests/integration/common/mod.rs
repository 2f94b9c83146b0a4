//! Shared helpers: a fake analysis service and server spawning.

#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};

/// A request the fake service received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    Text(String),
    Url(String),
    Image {
        filename: String,
        content_type: String,
        len: usize,
    },
}

type Log = Arc<Mutex<Vec<Recorded>>>;

/// Handle to a running fake analysis service.
pub struct FakeBackend {
    /// Base URL including the `/api` prefix.
    pub base_url: String,
    log: Log,
    _handle: tokio::task::JoinHandle<()>,
}

impl FakeBackend {
    /// Everything received so far, in order.
    pub fn requests(&self) -> Vec<Recorded> {
        self.log.lock().expect("log poisoned").clone()
    }
}

/// Finds a free local port.
pub fn find_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .expect("Failed to bind to port")
        .local_addr()
        .expect("Failed to get local addr")
        .port()
}

/// Serves `router` on a free port and returns `host:port`.
pub async fn spawn_router(router: Router) -> (String, tokio::task::JoinHandle<()>) {
    let port = find_available_port();
    let addr = format!("127.0.0.1:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");

    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Server failed");
    });

    // Give the server a moment to start
    tokio::time::sleep(Duration::from_millis(50)).await;

    (addr, handle)
}

/// Base URL pointing at a port nobody listens on.
pub fn unreachable_base_url() -> String {
    format!("http://127.0.0.1:{}/api", find_available_port())
}

/// Starts the fake analysis service.
///
/// Text behavior depends on the claim:
/// - `"boom"` answers 500 with `{"error": "Model unavailable"}`
/// - `"teapot"` answers 418 with an empty body
/// - `"slow"` answers after two seconds
/// - anything else scores 82 with six evidence items
pub async fn spawn_fake_backend() -> FakeBackend {
    let log: Log = Arc::default();

    let router = Router::new()
        .route("/api/analyze/text", post(analyze_text))
        .route("/api/analyze/url", post(analyze_url))
        .route("/api/analyze/image", post(analyze_image))
        .with_state(Arc::clone(&log));

    let (addr, handle) = spawn_router(router).await;

    FakeBackend {
        base_url: format!("http://{addr}/api"),
        log,
        _handle: handle,
    }
}

fn credible_body() -> Value {
    json!({
        "credibilityScore": 82,
        "riskLevel": "Low",
        "modelVersion": "fake-1",
        "explanation": {
            "whyFlagged": "Matches multiple wire reports",
            "supportingEvidence": ["AP", "Reuters", "AFP", "BBC", "NPR", "DW"]
        }
    })
}

async fn analyze_text(State(log): State<Log>, Json(body): Json<Value>) -> Response {
    let text = body["text"].as_str().unwrap_or_default().to_string();
    log.lock()
        .expect("log poisoned")
        .push(Recorded::Text(text.clone()));

    match text.as_str() {
        "boom" => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Model unavailable" })),
        )
            .into_response(),
        "teapot" => StatusCode::IM_A_TEAPOT.into_response(),
        "slow" => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(credible_body()).into_response()
        }
        _ => Json(credible_body()).into_response(),
    }
}

async fn analyze_url(State(log): State<Log>, Json(body): Json<Value>) -> Json<Value> {
    let url = body["url"].as_str().unwrap_or_default().to_string();
    log.lock().expect("log poisoned").push(Recorded::Url(url));

    Json(json!({
        "success": true,
        "data": { "credibilityScore": 55.4, "riskLevel": "Medium" }
    }))
}

async fn analyze_image(State(log): State<Log>, mut multipart: Multipart) -> Json<Value> {
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("image") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let len = field.bytes().await.map(|b| b.len()).unwrap_or_default();
        log.lock().expect("log poisoned").push(Recorded::Image {
            filename,
            content_type,
            len,
        });
    }

    Json(json!({
        "credibilityScore": 12,
        "riskLevel": "High",
        "explanation": { "whyFlagged": "Image was digitally altered", "supportingEvidence": null }
    }))
}
