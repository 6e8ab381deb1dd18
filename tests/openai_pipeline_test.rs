// tests/openai_pipeline_test.rs
// Full sessions against an in-process server speaking the OpenAI wire format

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use sillygen::session::Phase;
use sillygen::{Category, Companionship, Config, IdeaPipeline, Selection, Session};
use tempfile::TempDir;

const IDEA: &str = "Title: Water Balloon Ambush\n\
                    Description: Soak strangers politely.\n\
                    Execution Plan: Set up near a park.";

// ============================================================================
// Mock server
// ============================================================================

#[derive(Clone, Default)]
struct MockOpenAi {
    search_calls: Arc<Mutex<Vec<(String, Value)>>>,
    chat_calls: Arc<Mutex<Vec<Value>>>,
    auth_headers: Arc<Mutex<Vec<String>>>,
    search_fails: bool,
    failing_models: Vec<String>,
}

async fn search(
    State(mock): State<MockOpenAi>,
    Path(store_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record_auth(&mock, &headers);
    mock.search_calls.lock().unwrap().push((store_id, body));
    if mock.search_fails {
        return (StatusCode::INTERNAL_SERVER_ERROR, "index unavailable").into_response();
    }
    Json(json!({
        "object": "vector_store.search_results.page",
        "data": [
            {"file_id": "f1", "score": 0.9, "attributes": {"title": "Fake Restaurant", "style": "deadpan"}},
            {"file_id": "f2", "score": 0.8, "attributes": {"title": "Estate Agent Prank"}},
            {"file_id": "f3", "score": 0.7, "attributes": {"title": "Human Billboard"}}
        ],
        "has_more": false
    }))
    .into_response()
}

async fn chat(
    State(mock): State<MockOpenAi>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record_auth(&mock, &headers);
    let model = body["model"].as_str().unwrap_or_default().to_string();
    mock.chat_calls.lock().unwrap().push(body);
    if mock.failing_models.contains(&model) {
        return (StatusCode::TOO_MANY_REQUESTS, "rate limited").into_response();
    }
    Json(json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "model": model,
        "choices": [{"index": 0, "message": {"role": "assistant", "content": IDEA}, "finish_reason": "stop"}]
    }))
    .into_response()
}

fn record_auth(mock: &MockOpenAi, headers: &HeaderMap) {
    if let Some(value) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        mock.auth_headers.lock().unwrap().push(value.to_string());
    }
}

async fn spawn_server(mock: MockOpenAi) -> String {
    let app = Router::new()
        .route("/v1/vector_stores/{store_id}/search", post(search))
        .route("/v1/chat/completions", post(chat))
        .with_state(mock);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/v1")
}

fn fallback_dir(docs: usize) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for i in 0..docs {
        let doc = json!({"title": format!("Catalog {i}"), "payoff": "applause"});
        std::fs::write(tmp.path().join(format!("{i}.json")), doc.to_string()).unwrap();
    }
    tmp
}

fn config(base_url: &str, profile: &str, fallback: &TempDir) -> Config {
    let vars: HashMap<&str, String> = HashMap::from([
        ("OPENAI_API_KEY", "sk-test".to_string()),
        ("OPENAI_VECTOR_STORE_ID", "vs_fosh".to_string()),
        ("OPENAI_BASE_URL", base_url.to_string()),
        ("SILLYGEN_PROFILE", profile.to_string()),
        ("SILLYGEN_FALLBACK_DIR", fallback.path().display().to_string()),
    ]);
    Config::from_lookup(|key: &str| vars.get(key).cloned()).unwrap()
}

fn session_for(config: &Config) -> Session {
    Session::new(Arc::new(IdeaPipeline::from_config(config).unwrap()))
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_remote_examples_and_primary_model() {
    let mock = MockOpenAi::default();
    let base = spawn_server(mock.clone()).await;
    let fallback = fallback_dir(0);
    let mut session = session_for(&config(&base, "mates", &fallback));

    let view = session
        .submit(Selection::new(Category::Prank).with_companionship(Companionship::Friends))
        .await;

    assert_eq!(view.phase, Phase::Success);
    assert!(!view.is_busy);
    assert!(!view.had_error);
    assert!(!view.used_fallback);
    let idea = view.card().expect("idea card");
    assert_eq!(idea.title, "Water Balloon Ambush");
    assert_eq!(idea.description, "Soak strangers politely.");
    assert_eq!(idea.plan.as_deref(), Some("Set up near a park."));

    let searches = mock.search_calls.lock().unwrap();
    assert_eq!(searches.len(), 1);
    assert_eq!(searches[0].0, "vs_fosh");
    assert_eq!(searches[0].1["max_num_results"], 3);
    assert_eq!(
        searches[0].1["query"],
        "Max Fosh-style video, type: prank, mates: my friends"
    );

    let chats = mock.chat_calls.lock().unwrap();
    assert_eq!(chats.len(), 1);
    assert_eq!(chats[0]["model"], "gpt-4");
    assert_eq!(chats[0]["max_tokens"], 512);
    assert_eq!(chats[0]["messages"][0]["role"], "user");
    let prompt = chats[0]["messages"][0]["content"].as_str().unwrap();
    assert!(prompt.contains("Title: Fake Restaurant"));
    assert!(prompt.contains("Description: unknown"));
    assert!(prompt.ends_with("Execution Plan:"));

    assert!(mock
        .auth_headers
        .lock()
        .unwrap()
        .iter()
        .all(|h| h == "Bearer sk-test"));
}

#[tokio::test]
async fn test_rate_limited_primary_uses_secondary() {
    let mock = MockOpenAi {
        failing_models: vec!["gpt-4".to_string()],
        ..Default::default()
    };
    let base = spawn_server(mock.clone()).await;
    let fallback = fallback_dir(0);
    let mut session = session_for(&config(&base, "classic", &fallback));

    let view = session.submit(Selection::new(Category::Challenge)).await;

    assert!(!view.had_error);
    assert_eq!(view.card().unwrap().title, "Water Balloon Ambush");
    assert_eq!(view.card().unwrap().plan, None);
    let models: Vec<String> = mock
        .chat_calls
        .lock()
        .unwrap()
        .iter()
        .map(|c| c["model"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(models, ["gpt-4", "gpt-3.5-turbo"]);
}

#[tokio::test]
async fn test_index_outage_falls_back_to_catalog() {
    let mock = MockOpenAi {
        search_fails: true,
        ..Default::default()
    };
    let base = spawn_server(mock.clone()).await;
    let fallback = fallback_dir(3);
    let mut session = session_for(&config(&base, "mates", &fallback));

    let view = session.submit(Selection::new(Category::Bet)).await;

    assert_eq!(view.phase, Phase::Success);
    assert!(view.used_fallback);
    let chats = mock.chat_calls.lock().unwrap();
    let prompt = chats[0]["messages"][0]["content"].as_str().unwrap();
    assert!(prompt.contains("Title: Catalog"));
    assert!(prompt.contains("Payoff: applause"));
}

#[tokio::test]
async fn test_everything_down_is_a_flat_error() {
    let mock = MockOpenAi {
        search_fails: true,
        ..Default::default()
    };
    let base = spawn_server(mock.clone()).await;
    let fallback = fallback_dir(1);
    let mut session = session_for(&config(&base, "mates", &fallback));

    let view = session.submit(Selection::new(Category::Prank)).await;

    assert_eq!(view.phase, Phase::Error);
    assert!(view.had_error);
    assert_eq!(view.error_message(), Some("Try again"));
    assert_eq!(view.idea, None);
    assert!(mock.chat_calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_both_models_failing_stops_after_two_calls() {
    let mock = MockOpenAi {
        failing_models: vec!["gpt-4".to_string(), "gpt-3.5-turbo".to_string()],
        ..Default::default()
    };
    let base = spawn_server(mock.clone()).await;
    let fallback = fallback_dir(0);
    let mut session = session_for(&config(&base, "mates", &fallback));

    let view = session.submit(Selection::new(Category::Prank)).await;

    assert!(view.had_error);
    assert!(!view.is_busy);
    assert_eq!(mock.chat_calls.lock().unwrap().len(), 2);
    assert!(session.state().prompt.is_some());
    assert!(session.state().raw_completion.is_none());
}

#[tokio::test]
async fn test_instant_profile_never_touches_index() {
    let mock = MockOpenAi::default();
    let base = spawn_server(mock.clone()).await;
    let fallback = fallback_dir(5);
    let mut session = session_for(&config(&base, "instant", &fallback));

    let first = session.submit(Selection::new(Category::Prank)).await;
    let second = session.submit(Selection::new(Category::Challenge)).await;

    assert!(first.used_fallback && second.used_fallback);
    assert!(second.card().is_some());
    assert!(mock.search_calls.lock().unwrap().is_empty());
    assert_eq!(mock.chat_calls.lock().unwrap().len(), 2);
}
