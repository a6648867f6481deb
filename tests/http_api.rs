//! HTTP API tests driving the router in-process.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use promptops::config::ValidationPolicy;
use promptops::http::{AppState, router};
use promptops::services::PromptService;
use promptops::storage::{MemoryPromptStore, PromptStore, SqlitePromptStore};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

fn app_with(store: Arc<dyn PromptStore>) -> Router {
    router(AppState::new(PromptService::new(store)))
}

fn fallback_app() -> Router {
    app_with(Arc::new(MemoryPromptStore::new()))
}

fn sqlite_app() -> Router {
    app_with(Arc::new(SqlitePromptStore::in_memory(true).unwrap()))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn post(app: &Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    post_raw(app, uri, body.to_string()).await
}

async fn post_raw(app: &Router, uri: &str, body: String) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

#[tokio::test]
async fn test_health_reports_store_mode() {
    let (status, body) = get(&fallback_app(), "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true, "mode": "local-fallback"}));

    let (_, body) = get(&sqlite_app(), "/api/health").await;
    assert_eq!(body["mode"], "external-store");
}

#[tokio::test]
async fn test_fallback_create_returns_full_prompt() {
    let app = fallback_app();
    let (status, body) = post(
        &app,
        "/api/prompts",
        &json!({"title": "Summarize", "content": "Summarize {{text}}", "model": "gpt-4o"}),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["title"], "Summarize");
    assert_eq!(body["tags"], json!([]));
    assert_eq!(body["examples"], json!([]));
    assert_eq!(body["versions"].as_array().unwrap().len(), 1);
    assert_eq!(body["versions"][0]["version"], 1);
    assert_eq!(body["versions"][0]["content"], "Summarize {{text}}");
    assert!(body["createdAt"].is_string());
}

#[tokio::test]
async fn test_external_store_create_returns_id_only() {
    let app = sqlite_app();
    let (status, body) = post(
        &app,
        "/api/prompts",
        &json!({
            "title": "Classify",
            "content": "Classify the ticket",
            "tags": ["support"],
            "model": "o3-mini",
            "temperature": 0.2,
            "top_p": 0.9,
            "max_tokens": 256,
            "examples": ["ticket: refund"]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let object = body.as_object().unwrap();
    assert_eq!(object.len(), 1);
    let id = object["id"].as_str().unwrap();

    let (status, prompt) = get(&app, &format!("/api/prompts/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(prompt["config"], json!({"temperature": 0.2, "top_p": 0.9, "max_tokens": 256}));
    assert_eq!(prompt["examples"], json!(["ticket: refund"]));
    assert_eq!(prompt["versions"][0]["content"], "Classify the ticket");
}

#[tokio::test]
async fn test_list_is_newest_first_with_version_projection() {
    let app = sqlite_app();
    for title in ["first", "second", "third"] {
        let (status, _) = post(
            &app,
            "/api/prompts",
            &json!({"title": title, "content": "body", "model": "gpt-4o-mini"}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = get(&app, "/api/prompts").await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, ["third", "second", "first"]);
    assert_eq!(body[0]["versions"], json!([{"version": 1, "createdAt": body[0]["createdAt"]}]));
}

#[tokio::test]
async fn test_empty_list() {
    let (status, body) = get(&fallback_app(), "/api/prompts").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_invalid_create_requests_are_rejected() {
    let app = fallback_app();
    let cases = [
        json!({"content": "c", "model": "gpt-4o"}),
        json!({"title": "t", "content": "", "model": "gpt-4o"}),
        json!({"title": "t", "content": "c", "model": "unknown"}),
        json!({"title": "t", "content": "c", "model": "gpt-4o", "temperature": 3.0}),
    ];
    for case in cases {
        let (status, body) = post(&app, "/api/prompts", &case).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "case: {case}");
        assert!(body["error"].is_string());
    }

    let (_, body) = get(&app, "/api/prompts").await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_null_tags_and_examples_read_as_empty() {
    let (status, body) = post(
        &fallback_app(),
        "/api/prompts",
        &json!({"title": "t", "content": "c", "model": "gpt-4o", "tags": null, "examples": null}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["tags"], json!([]));
    assert_eq!(body["examples"], json!([]));
}

#[tokio::test]
async fn test_store_fault_is_internal_error_with_message() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("prompts.db");
    let store = SqlitePromptStore::new(&path, false).unwrap();
    rusqlite::Connection::open(&path)
        .unwrap()
        .execute_batch(
            "CREATE TRIGGER reject_versions BEFORE INSERT ON prompt_versions
             BEGIN SELECT RAISE(ABORT, 'version insert rejected'); END;",
        )
        .unwrap();
    let app = app_with(Arc::new(store));

    let (status, body) = post(
        &app,
        "/api/prompts",
        &json!({"title": "t", "content": "c", "model": "gpt-4o"}),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let object = body.as_object().unwrap();
    assert_eq!(object.len(), 1);
    let message = object["error"].as_str().unwrap();
    assert!(message.contains("insert_prompt_version"), "{message}");
    assert!(message.contains("version insert rejected"), "{message}");

    // Two-step write: the prompt row stays without versions.
    let (_, listed) = get(&app, "/api/prompts").await;
    assert_eq!(listed[0]["versions"], json!([]));
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let (status, body) = post_raw(&fallback_app(), "/api/prompts", "{not json".to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_permissive_policy_accepts_unknown_model() {
    let service = PromptService::new(Arc::new(MemoryPromptStore::new()))
        .with_policy(ValidationPolicy::permissive());
    let app = router(AppState::new(service));
    let (status, body) = post(
        &app,
        "/api/prompts",
        &json!({"title": "t", "content": "c", "model": "local-llama"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["model"], "local-llama");
}

#[tokio::test]
async fn test_unknown_prompt_is_not_found() {
    let (status, body) = get(&fallback_app(), "/api/prompts/does-not-exist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("does-not-exist"));
}

#[tokio::test]
async fn test_ab_test_known_seed() {
    let (status, body) = post(
        &fallback_app(),
        "/api/ab-test",
        &json!({"promptA": "p1", "promptB": "p2", "modelA": "gpt-4o", "modelB": "gpt-4o-mini"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["winner"], "Prompt B (gpt-4o-mini)");
    assert_eq!(
        body["rationale"],
        "Placeholder deterministic evaluator. Connect OpenAI eval later."
    );
}

#[tokio::test]
async fn test_recommend_scenario() {
    let (status, body) = post(
        &fallback_app(),
        "/api/recommend",
        &json!({"quality": 5, "latency": 3, "cost": 3, "context": 4, "multimodal": 2}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recommendation"], json!({"model": "gpt-4o-mini", "score": 74.0}));
    assert_eq!(
        body["ranked"],
        json!([
            {"model": "gpt-4o-mini", "score": 74.0},
            {"model": "gpt-4o", "score": 70.0},
            {"model": "o3-mini", "score": 62.0}
        ])
    );
}

#[tokio::test]
async fn test_recommend_missing_weights_default_to_zero() {
    let (status, body) = post(&fallback_app(), "/api/recommend", &json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recommendation"]["model"], "gpt-4o");
    assert_eq!(body["ranked"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_models_lists_catalog() {
    let (status, body) = get(&fallback_app(), "/api/models").await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["gpt-4o", "gpt-4o-mini", "o3-mini"]);
    assert_eq!(body[1]["cost"], 5);
}

#[tokio::test]
async fn test_responses_carry_nosniff_header() {
    let response = fallback_app()
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(
        response.headers().get(header::X_CONTENT_TYPE_OPTIONS).unwrap(),
        "nosniff"
    );
}
