//! Integration tests for the session server.
//!
//! Each test starts the real router on a local port and drives it with
//! HTTP and WebSocket clients.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{spawn_fake_backend, spawn_router, unreachable_base_url, Recorded};
use factlens_core::error::{EMPTY_INPUT_MESSAGE, UNREACHABLE_MESSAGE};
use factlens_core::notify::{Level, MessagePayload};
use factlens_core::{
    create_router, AppState, Config, HttpAnalysisClient, Notification, QuestionBank,
};
use futures::StreamExt;
use serde_json::{json, Value};
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// Starts a session server whose analysis calls go to `api_base_url`.
async fn spawn_server(api_base_url: &str) -> String {
    let config = Config {
        api_base_url: api_base_url.to_string(),
        ..Default::default()
    };
    let backend = Arc::new(HttpAnalysisClient::from_config(&config));
    let state = AppState::new(config, backend, QuestionBank::builtin());

    let (addr, _handle) = spawn_router(create_router(state)).await;
    addr
}

/// Receives the next notification event, answering pings on the way.
async fn receive_event<S>(ws: &mut S) -> Notification
where
    S: StreamExt<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    let timeout = Duration::from_secs(5);
    loop {
        let msg = tokio::time::timeout(timeout, ws.next())
            .await
            .expect("Timeout waiting for event")
            .expect("Stream ended")
            .expect("WebSocket error");

        match msg {
            Message::Text(text) => {
                return serde_json::from_str(&text).expect("Failed to parse event");
            }
            Message::Ping(_) | Message::Pong(_) => continue,
            other => panic!("Unexpected message: {other:?}"),
        }
    }
}

// ============================================================================
// Health and Analyze
// ============================================================================

#[tokio::test]
async fn test_health() {
    let addr = spawn_server(&unreachable_base_url()).await;

    let body: Value = reqwest::get(format!("http://{addr}/api/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_analyze_text_through_server() {
    let fake = spawn_fake_backend().await;
    let addr = spawn_server(&fake.base_url).await;
    let client = reqwest::Client::new();

    let view: Value = client
        .put(format!("http://{addr}/api/analyze/input"))
        .json(&json!({ "text": "Octopuses have three hearts" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view["inputText"], "Octopuses have three hearts");
    assert_eq!(view["submitDisabled"], false);

    let response = client
        .post(format!("http://{addr}/api/analyze"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let view: Value = response.json().await.unwrap();
    assert_eq!(view["busy"], false);
    assert_eq!(view["result"]["verdict"], "True");
    assert_eq!(view["result"]["score"], 82);
    assert_eq!(view["result"]["evidence"].as_array().unwrap().len(), 5);
    assert!(view.get("error").is_none());

    assert_eq!(
        fake.requests(),
        vec![Recorded::Text("Octopuses have three hearts".to_string())]
    );
}

#[tokio::test]
async fn test_image_upload_through_server() {
    let fake = spawn_fake_backend().await;
    let addr = spawn_server(&fake.base_url).await;
    let client = reqwest::Client::new();

    let rejected = client
        .put(format!("http://{addr}/api/analyze/image?filename=notes.txt"))
        .header("content-type", "text/plain")
        .body("hello")
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status(), 415);

    let view: Value = client
        .put(format!("http://{addr}/api/analyze/image?filename=scan.png"))
        .header("content-type", "image/png")
        .body(vec![7u8; 32])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view["attachment"], "scan.png");

    let view: Value = client
        .post(format!("http://{addr}/api/analyze"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view["result"]["verdict"], "Fake");
    assert_eq!(view["result"]["variant"], "danger");

    assert_eq!(
        fake.requests(),
        vec![Recorded::Image {
            filename: "scan.png".to_string(),
            content_type: "image/png".to_string(),
            len: 32,
        }]
    );
}

#[tokio::test]
async fn test_empty_submit_is_rejected_inline() {
    let addr = spawn_server(&unreachable_base_url()).await;

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/api/analyze"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 422);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], EMPTY_INPUT_MESSAGE);

    let view: Value = reqwest::get(format!("http://{addr}/api/analyze"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view["error"], EMPTY_INPUT_MESSAGE);
    assert_eq!(view["submitDisabled"], true);
}

// ============================================================================
// WebSocket Notifications
// ============================================================================

#[tokio::test]
async fn test_websocket_receives_connected_event() {
    let addr = spawn_server(&unreachable_base_url()).await;

    let (mut ws, _) = connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("Failed to connect");

    let event = receive_event(&mut ws).await;
    assert!(matches!(event, Notification::Connected(_)));
}

#[tokio::test]
async fn test_failed_submit_is_broadcast() {
    let addr = spawn_server(&unreachable_base_url()).await;
    let client = reqwest::Client::new();

    let (mut ws1, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
    let (mut ws2, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
    assert!(matches!(receive_event(&mut ws1).await, Notification::Connected(_)));
    assert!(matches!(receive_event(&mut ws2).await, Notification::Connected(_)));

    client
        .put(format!("http://{addr}/api/analyze/input"))
        .json(&json!({ "text": "The moon landing was staged" }))
        .send()
        .await
        .unwrap();

    let response = client
        .post(format!("http://{addr}/api/analyze"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 502);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], UNREACHABLE_MESSAGE);

    let expected = Notification::Notification(MessagePayload {
        level: Level::Error,
        message: UNREACHABLE_MESSAGE.to_string(),
    });
    assert_eq!(receive_event(&mut ws1).await, expected);
    assert_eq!(receive_event(&mut ws2).await, expected);

    // Busy is cleared and the input is kept for a retry
    let view: Value = reqwest::get(format!("http://{addr}/api/analyze"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view["busy"], false);
    assert_eq!(view["inputText"], "The moon landing was staged");
    assert_eq!(view["error"], UNREACHABLE_MESSAGE);
}

// ============================================================================
// Game
// ============================================================================

#[tokio::test]
async fn test_game_round_through_server() {
    let addr = spawn_server(&unreachable_base_url()).await;
    let client = reqwest::Client::new();
    let url = |path: &str| format!("http://{addr}/api/game{path}");

    let game: Value = reqwest::get(url("")).await.unwrap().json().await.unwrap();
    assert_eq!(game["questionNumber"], 1);
    assert_eq!(game["xp"], 30);
    assert_eq!(game["phase"], "presenting");
    assert_eq!(game["league"], "League: Lv 1 \u{2013} Curious Reader");

    // Question 1 is a fact
    let game: Value = client
        .post(url("/swipe"))
        .json(&json!({ "direction": "right" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(game["phase"], "revealing");
    assert_eq!(game["reveal"]["wasCorrect"], true);
    assert_eq!(game["revealTitle"], "It's a fact! +5 XP");
    assert_eq!(game["xp"], 35);

    // Deciding twice is a conflict
    let conflict = client
        .post(url("/swipe"))
        .json(&json!({ "direction": "left" }))
        .send()
        .await
        .unwrap();
    assert_eq!(conflict.status(), 409);

    client.post(url("/next")).send().await.unwrap();

    // A short drag snaps back
    let drag: Value = client
        .post(url("/drag"))
        .json(&json!({ "offsetX": 120.0 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(drag["snappedBack"], true);
    assert_eq!(drag["game"]["phase"], "presenting");

    // Question 2 is fake, decided by dragging left
    let drag: Value = client
        .post(url("/drag"))
        .json(&json!({ "offsetX": -180.0 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(drag["snappedBack"], false);
    assert_eq!(drag["game"]["xp"], 40);
    assert_eq!(drag["game"]["streak"], 2);
    assert_eq!(drag["game"]["showsStreak"], true);

    client.post(url("/next")).send().await.unwrap();

    // Question 3 is fake; a streak of two earns the bonus
    let game: Value = client
        .post(url("/swipe"))
        .json(&json!({ "direction": "left" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(game["xp"], 48);

    client.post(url("/next")).send().await.unwrap();

    // Question 4 is a fact; the third bonus crosses into league 2
    let game: Value = client
        .post(url("/swipe"))
        .json(&json!({ "direction": "right" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(game["xp"], 56);
    assert_eq!(game["league"], "League: Lv 2 \u{2013} Signal Seeker");

    let game: Value = client
        .post(url("/reset"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(game["questionNumber"], 1);
    assert_eq!(game["xp"], 30);
    assert_eq!(game["streak"], 0);
}

#[tokio::test]
async fn test_next_before_decision_is_conflict() {
    let addr = spawn_server(&unreachable_base_url()).await;

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/api/game/next"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Invalid state transition"));
}
