use std::sync::Arc;

use axum::body::{ to_bytes, Body };
use axum::http::{ header::CONTENT_TYPE, Request, StatusCode };
use axum::Router;
use persona_chat::agent::PersonaAgent;
use persona_chat::config::prompt::PersonaPrompt;
use persona_chat::history::MemoryConversationStore;
use persona_chat::llm::chat::new_client;
use persona_chat::llm::LlmConfig;
use persona_chat::server::api::{ build_router, AppState, GENERIC_FAILURE_MESSAGE };
use serde_json::{ json, Value };
use tower::ServiceExt;
use wiremock::matchers::{ method, path };
use wiremock::{ Mock, MockServer, ResponseTemplate };

const API_KEY: &str = "sk-integration-secret";

fn app_against(server: &MockServer) -> Router {
    let config = LlmConfig {
        api_key: Some(API_KEY.to_string()),
        base_url: Some(format!("{}/v1", server.uri())),
        ..Default::default()
    };
    let client = new_client(&config).unwrap();
    let agent = Arc::new(PersonaAgent::new(client, PersonaPrompt::built_in()));
    build_router(AppState::new(agent, Arc::new(MemoryConversationStore::new())))
}

async fn post_chat(app: Router, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn question_about_anthroposophy_gets_an_answer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(
                json!({
                    "choices": [{
                        "message": {
                            "role": "assistant",
                            "content": "In der Geisteswissenschaft erkennen wir den Menschen als geistiges Wesen."
                        }
                    }]
                })
            )
        )
        .expect(1)
        .mount(&server).await;

    let (status, body) = post_chat(
        app_against(&server),
        json!({ "message": "Was ist Anthroposophie?" })
    ).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"]["role"], "assistant");
    assert!(!body["message"]["content"].as_str().unwrap().is_empty());
    assert!(!body["conversationId"].as_str().unwrap().is_empty());

    let requests = server.received_requests().await.unwrap();
    let sent: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let messages = sent["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "system");
    assert_eq!(messages[1], json!({ "role": "user", "content": "Was ist Anthroposophie?" }));
}

#[tokio::test]
async fn empty_message_never_reaches_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server).await;

    let (status, body) = post_chat(app_against(&server), json!({ "message": "" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["fieldErrors"]["message"].is_array());
}

#[tokio::test]
async fn upstream_outage_yields_generic_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(
                json!({ "error": { "message": "The server had an error while processing your request." } })
            )
        )
        .expect(1)
        .mount(&server).await;

    let (status, body) = post_chat(app_against(&server), json!({ "message": "Hallo" })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": GENERIC_FAILURE_MESSAGE }));
    let text = body.to_string();
    assert!(!text.contains(API_KEY));
    assert!(!text.contains("processing your request"));
}

#[tokio::test]
async fn blank_completion_is_a_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(
                json!({ "choices": [{ "message": { "role": "assistant", "content": "" } }] })
            )
        )
        .mount(&server).await;

    let (status, body) = post_chat(app_against(&server), json!({ "message": "Hallo" })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.get("message").is_none());
}
