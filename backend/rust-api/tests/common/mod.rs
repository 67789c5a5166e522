#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use cyberquiz_api::{
    config::Config,
    create_router,
    services::{question_bank::QuestionBank, quiz_service::QuizService, AppState},
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Three beginner, two intermediate and one advanced question.
pub const SMALL_BANK: &str = r#"{
  "beginner": [
    {"id": "b1", "tier": "beginner", "category": "networking", "question": "B1?", "options": ["a", "b", "c", "d"], "correct_answer": 0, "explanation": ""},
    {"id": "b2", "tier": "beginner", "category": "networking", "question": "B2?", "options": ["a", "b", "c", "d"], "correct_answer": 1, "explanation": ""},
    {"id": "b3", "tier": "beginner", "category": "fundamentals", "question": "B3?", "options": ["a", "b", "c", "d"], "correct_answer": 2, "explanation": ""}
  ],
  "intermediate": [
    {"id": "i1", "tier": "intermediate", "category": "cryptography", "question": "I1?", "options": ["a", "b", "c", "d"], "correct_answer": 3, "explanation": ""},
    {"id": "i2", "tier": "intermediate", "category": "cryptography", "question": "I2?", "options": ["a", "b", "c", "d"], "correct_answer": 0, "explanation": ""}
  ],
  "advanced": [
    {"id": "a1", "tier": "advanced", "category": "security", "question": "A1?", "options": ["a", "b", "c", "d"], "correct_answer": 1, "explanation": ""}
  ]
}"#;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// App backed by the built-in question bank and default settings.
pub fn create_test_app() -> Router {
    init_tracing();

    let app_state =
        Arc::new(AppState::new(Config::default()).expect("Failed to initialize test app state"));
    create_router(app_state)
}

/// App backed by [`SMALL_BANK`], small enough to exhaust in a few requests.
pub fn create_small_bank_app() -> Router {
    init_tracing();

    let config = Config::default();
    let bank = QuestionBank::from_json_str(SMALL_BANK).expect("Failed to parse test bank");
    let quiz = Arc::new(QuizService::new(Arc::new(bank), config.adaptive));
    create_router(Arc::new(AppState { config, quiz }))
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, json)
}

pub async fn create_session(app: &Router) -> String {
    let (status, json) = send(app, "POST", "/api/v1/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED, "body: {}", json);
    json["session_id"].as_str().unwrap().to_string()
}
