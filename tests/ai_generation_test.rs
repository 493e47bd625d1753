mod common;

use std::sync::Arc;

use axum::{
    http::{Method, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use common::{app, send, spawn_server, test_config, token, MemoryStore};
use ficct_talent::{models::aptitude_test::TestContext, services::ai_service::AIService};
use serde_json::json;

const QUIZ_REPLY: &str = r#"Aquí está la prueba solicitada:
```json
{
  "title": "Prueba técnica Rust",
  "duration": 45,
  "questions": [
    {"id": 1, "type": "multiple_choice", "question": "¿Qué garantiza el borrow checker?",
     "options": ["Nada", "Ausencia de data races", "Velocidad", "Portabilidad"], "correctAnswer": 1, "points": 20},
    {"id": 2, "type": "true_false", "question": "Vec<T> vive en el heap", "correctAnswer": true},
    {"id": 3, "type": "text", "question": "Explica qué es un trait"}
  ]
}
```
Suerte."#;

/// Serves every `generateContent` call with `status` and a single text part.
fn fake_gemini(status: StatusCode, text: &'static str) -> Router {
    Router::new().route(
        "/models/:call",
        post(move || async move {
            (
                status,
                Json(json!({
                    "candidates": [{"content": {"parts": [{"text": text}]}}]
                })),
            )
                .into_response()
        }),
    )
}

async fn service(status: StatusCode, text: &'static str) -> AIService {
    let base = spawn_server(fake_gemini(status, text)).await;
    AIService::new(
        "test-key".into(),
        base,
        "gemini-test".into(),
        reqwest::Client::new(),
    )
}

fn context() -> TestContext {
    TestContext {
        job_title: "Desarrollador Rust".into(),
        company_name: Some("Tecnologías Andinas".into()),
        question_count: Some(3),
        ..TestContext::default()
    }
}

#[tokio::test]
async fn fenced_reply_becomes_a_test() {
    let ai = service(StatusCode::OK, QUIZ_REPLY).await;
    let out = ai.generate_test(&context(), 30).await;

    assert!(!out.used_fallback, "{:?}", out.fallback_reason);
    assert_eq!(out.test.title, "Prueba técnica Rust");
    assert_eq!(out.test.duration, 45);
    assert_eq!(out.test.questions.len(), 3);
    assert_eq!(out.test.total_points, 40);
    assert!(out.logs.iter().any(|l| l.starts_with("Finalized 3 questions")));
}

#[tokio::test]
async fn unusable_reply_falls_back_with_a_reason() {
    let ai = service(StatusCode::OK, "Lo siento, no puedo ayudar con eso.").await;
    let out = ai.generate_test(&context(), 30).await;

    assert!(out.used_fallback);
    assert!(out.fallback_reason.unwrap().contains("not JSON"));
    assert_eq!(out.test.questions.len(), 1);
}

#[tokio::test]
async fn model_errors_fall_back_to_the_default_quiz() {
    let ai = service(StatusCode::INTERNAL_SERVER_ERROR, "overloaded").await;
    let out = ai.generate_test(&context(), 30).await;

    assert!(out.used_fallback);
    assert!(out
        .fallback_reason
        .unwrap()
        .starts_with("generation request failed"));
}

#[tokio::test]
async fn generate_route_is_for_companies_and_sessions_hide_the_key() {
    let gemini = spawn_server(fake_gemini(StatusCode::OK, QUIZ_REPLY)).await;
    let store = Arc::new(MemoryStore::default());
    let app = app(test_config("http://127.0.0.1:9", &gemini), store);

    let payload = json!({"job_title": "Desarrollador Rust", "duration_minutes": 20});

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/aptitude/generate",
        Some(&token("student-1", "student")),
        Some(payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/aptitude/generate",
        Some(&token("company-1", "company")),
        Some(payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["used_fallback"], false);
    assert_eq!(body["data"]["test"]["duration"], 20);
    assert_eq!(body["data"]["test"]["questions"][0]["correctAnswer"], 1);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/aptitude/generate",
        Some(&token("company-1", "company")),
        Some(json!({"job_title": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/aptitude/sessions",
        Some(&token("student-1", "student")),
        Some(json!({"generate": payload, "job_id": "j1"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let session = &body["data"]["session"];
    assert_eq!(session["job_id"], "j1");
    assert_eq!(session["duration_seconds"], 1200);
    assert_eq!(session["total_questions"], 3);
    assert!(session["questions"][0].get("correctAnswer").is_none());
    assert_eq!(body["data"]["generation"]["used_fallback"], false);
}
