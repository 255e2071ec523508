//! Integration tests for the artifact HTTP API.
//!
//! Each test binds a real server on an ephemeral port and talks to it with
//! `reqwest`, so routing, JSON bodies, status codes, and the SQLite store are
//! exercised together.

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::{json, Value};
use studyai_server::{build_state, serve, Config};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// A running server and the handle that stops it.
struct TestServer {
    base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl TestServer {
    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("Server did not shut down")
            .expect("Server task panicked");
    }
}

/// Spawns a server backed by `database_url`.
async fn spawn_server(database_url: &str) -> TestServer {
    let config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: database_url.to_string(),
        flashcard_count: 4,
    };
    let state = build_state(&config).await.expect("Failed to build state");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get local addr");

    let (tx, rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(async move {
        serve(listener, state, async {
            let _ = rx.await;
        })
        .await
        .expect("Server failed");
    });

    TestServer {
        base_url: format!("http://{addr}"),
        shutdown: Some(tx),
        handle,
    }
}

async fn post_json(client: &reqwest::Client, url: &str, body: Value) -> (StatusCode, Value) {
    let response = client
        .post(url)
        .json(&body)
        .send()
        .await
        .expect("Request failed");
    let status = response.status();
    let json = response.json().await.expect("Response was not JSON");
    (status, json)
}

async fn get_json(client: &reqwest::Client, url: &str) -> (StatusCode, Value) {
    let response = client.get(url).send().await.expect("Request failed");
    let status = response.status();
    let json = response.json().await.expect("Response was not JSON");
    (status, json)
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let server = spawn_server("sqlite::memory:").await;
    let client = reqwest::Client::new();

    let (status, body) = get_json(&client, &server.url("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "OK", "message": "StudyAI API is running"}));

    server.stop().await;
}

// ============================================================================
// Create and fetch
// ============================================================================

#[tokio::test]
async fn test_quiz_create_then_fetch_returns_same_document() {
    let server = spawn_server("sqlite::memory:").await;
    let client = reqwest::Client::new();

    let (status, created) = post_json(
        &client,
        &server.url("/api/quiz/generate"),
        json!({"topic": "photosynthesis", "numQuestions": 6}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let questions = created["questions"].as_array().expect("questions array");
    assert_eq!(questions.len(), 6);
    assert_eq!(questions[0]["type"], "multiple-choice");
    assert_eq!(questions[0]["options"].as_array().map(Vec::len), Some(4));
    assert_eq!(questions[1]["type"], "true-false");
    assert!(questions[1].get("options").is_none());
    assert_eq!(questions[2]["type"], "open-ended");

    let id = created["id"].as_str().expect("id string");
    let (status, fetched) = get_json(&client, &server.url(&format!("/api/quiz/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    server.stop().await;
}

#[tokio::test]
async fn test_flashcards_use_configured_count() {
    let server = spawn_server("sqlite::memory:").await;
    let client = reqwest::Client::new();

    let (status, created) = post_json(
        &client,
        &server.url("/api/flashcards/generate"),
        json!({"topic": "mitosis"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["title"], "Flashcards: mitosis");

    let cards = created["cards"].as_array().expect("cards array");
    assert_eq!(cards.len(), 4);
    assert_eq!(cards[0]["difficulty"], "easy");
    assert_eq!(cards[1]["difficulty"], "medium");

    server.stop().await;
}

#[tokio::test]
async fn test_study_guide_formats() {
    let server = spawn_server("sqlite::memory:").await;
    let client = reqwest::Client::new();
    let url = server.url("/api/studyguide/generate");

    let (_, outline) = post_json(&client, &url, json!({"content": "notes"})).await;
    assert_eq!(outline["format"], "outline");
    assert_eq!(outline["outline"][0]["title"], "Key Concepts");
    assert_eq!(outline["outline"][0]["items"].as_array().map(Vec::len), Some(3));
    assert!(outline["outline"][0].get("points").is_none());
    assert!(outline.get("summary").is_none());

    let (_, both) = post_json(&client, &url, json!({"content": "notes", "format": "both"})).await;
    assert_eq!(both["outline"][1]["items"][0], "Term 1: Definition");
    assert!(both["summary"].is_string());
    assert!(both["keyPoints"].is_array());

    server.stop().await;
}

// ============================================================================
// Errors
// ============================================================================

#[tokio::test]
async fn test_not_found_messages_per_kind() {
    let server = spawn_server("sqlite::memory:").await;
    let client = reqwest::Client::new();
    let id = uuid::Uuid::new_v4();

    for (path, message) in [
        ("quiz", "Quiz not found"),
        ("flashcards", "Flashcard set not found"),
        ("studyguide", "Study guide not found"),
    ] {
        let (status, body) = get_json(&client, &server.url(&format!("/api/{path}/{id}"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "GET /api/{path}/:id");
        assert_eq!(body["error"], message);
    }

    server.stop().await;
}

#[tokio::test]
async fn test_blank_subject_is_rejected_and_nothing_stored() {
    let server = spawn_server("sqlite::memory:").await;
    let client = reqwest::Client::new();

    let (status, body) = post_json(
        &client,
        &server.url("/api/flashcards/generate"),
        json!({"topic": "   "}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some_and(|e| e.contains("topic")));

    let (status, _) = post_json(
        &client,
        &server.url("/api/studyguide/generate"),
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    server.stop().await;
}

// ============================================================================
// Persistence
// ============================================================================

#[tokio::test]
async fn test_artifacts_survive_restart() {
    let path = std::env::temp_dir().join(format!("studyai-{}.db", uuid::Uuid::new_v4()));
    let database_url = format!("sqlite://{}?mode=rwc", path.display());
    let client = reqwest::Client::new();

    let first = spawn_server(&database_url).await;
    let (status, created) = post_json(
        &client,
        &first.url("/api/quiz/generate"),
        json!({"topic": "rivers", "questionType": "true-false", "numQuestions": 2}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    first.stop().await;

    let second = spawn_server(&database_url).await;
    let id = created["id"].as_str().expect("id string");
    let (status, fetched) = get_json(&client, &second.url(&format!("/api/quiz/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
    second.stop().await;

    std::fs::remove_file(&path).ok();
}
