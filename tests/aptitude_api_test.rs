mod common;

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use axum::{
    http::{Method, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use common::{app, send, spawn_server, test_config, token, MemoryStore};
use serde_json::json;

fn backend_quiz() -> serde_json::Value {
    json!({
        "title": "Prueba de aptitud: Backend",
        "duration": 15,
        "questions": [
            {"id": 1, "type": "multiple_choice", "question": "¿Qué verbo HTTP es idempotente?",
             "options": ["POST", "PUT", "PATCH"], "correctAnswer": 1, "points": 10},
            {"id": 2, "type": "true_false", "question": "SQL es un lenguaje declarativo",
             "correctAnswer": true, "points": 10},
            {"id": 3, "type": "code", "question": "Invierte una cadena", "points": 20, "language": "javascript"}
        ]
    })
}

/// Fake Gemini that answers the first call with `quiz` in a fence and fails
/// every later call.
async fn gemini_serving(quiz: serde_json::Value) -> String {
    let calls = Arc::new(AtomicUsize::new(0));
    let reply = format!("```json\n{}\n```", quiz);
    let router = Router::new().route(
        "/models/:call",
        post(move || {
            let calls = calls.clone();
            let reply = reply.clone();
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Json(json!({
                        "candidates": [{"content": {"parts": [{"text": reply}]}}]
                    }))
                    .into_response()
                } else {
                    StatusCode::SERVICE_UNAVAILABLE.into_response()
                }
            }
        }),
    );
    spawn_server(router).await
}

fn generation_request() -> serde_json::Value {
    json!({
        "generate": {"job_title": "Desarrollador Backend", "duration_minutes": 15},
        "job_id": "job-7"
    })
}

#[tokio::test]
async fn session_lifecycle_end_to_end() {
    let gemini = gemini_serving(backend_quiz()).await;
    let store = Arc::new(MemoryStore::default());
    let app = app(test_config("http://127.0.0.1:9", &gemini), store.clone());
    let student = token("student-1", "student");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/aptitude/sessions",
        Some(&student),
        Some(generation_request()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let session = &body["data"]["session"];
    let id = session["id"].as_str().unwrap().to_string();
    assert_eq!(session["remaining_seconds"], 900);
    assert_eq!(session["total_questions"], 3);
    assert_eq!(session["status"], "active");
    assert!(session["current_question"].get("correctAnswer").is_none());
    assert!(session["questions"][0].get("correctAnswer").is_none());
    assert_eq!(body["data"]["generation"]["used_fallback"], false);

    let answers = [
        json!({"question_id": 1, "answer": 1}),
        json!({"question_id": 2, "answer": false}),
        json!({"question_id": 3, "answer": "const r = s => s.split('').reverse().join('');"}),
    ];
    for answer in answers {
        let (status, _) = send(
            &app,
            Method::PUT,
            &format!("/api/aptitude/sessions/{}/answers", id),
            Some(&student),
            Some(answer),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/aptitude/sessions/{}/navigate", id),
        Some(&student),
        Some(json!({"direction": "next"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["current_index"], 1);
    assert_eq!(body["data"]["answered_count"], 3);

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/aptitude/sessions/{}/submit", id),
        Some(&student),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let result = &body["data"];
    assert_eq!(result["earned_points"], 30);
    assert_eq!(result["total_points"], 40);
    assert_eq!(result["score"], 75);
    assert_eq!(result["feedback"]["tier"], "good");
    assert_eq!(result["graded"][2]["heuristic"], true);
    let submission_id = result["submission_id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/aptitude/sessions/{}/submit", id),
        Some(&student),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(store.len(), 1);

    let (status, body) = send(&app, Method::GET, "/api/aptitude/history", Some(&student), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["job_id"], "job-7");

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/aptitude/results/{}", submission_id),
        Some(&token("student-2", "student")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/aptitude/results/{}", submission_id),
        Some(&token("admin-1", "admin")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["student_id"], "student-1");

    // the model is unavailable after generation, so insights fall back to the tier text
    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/aptitude/results/{}/insights", submission_id),
        Some(&student),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["canned"], true);
    assert!(body["data"]["insights"].as_str().unwrap().contains("¡Buen trabajo!"));
}

#[tokio::test]
async fn only_admins_start_sessions_from_a_backend_quiz() {
    let store = Arc::new(MemoryStore::default());
    let app = app(test_config("http://127.0.0.1:9", "http://127.0.0.1:9"), store.clone());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/aptitude/sessions",
        Some(&token("student-1", "student")),
        Some(json!({"test": backend_quiz(), "application_id": "app-3"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/aptitude/sessions",
        Some(&token("admin-1", "admin")),
        Some(json!({"test": backend_quiz()})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["session"]["total_questions"], 3);
    assert_eq!(store.len(), 0);
}

#[tokio::test]
async fn sessions_are_private_and_validated() {
    let gemini = gemini_serving(backend_quiz()).await;
    let store = Arc::new(MemoryStore::default());
    let app = app(test_config("http://127.0.0.1:9", &gemini), store);
    let owner = token("student-1", "student");

    let (status, body) = send(&app, Method::POST, "/api/aptitude/sessions", None, Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/aptitude/sessions",
        Some(&owner),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/aptitude/sessions",
        Some(&token("company-1", "company")),
        Some(json!({"test": backend_quiz()})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/aptitude/sessions",
        Some(&owner),
        Some(generation_request()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let id = body["data"]["session"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/aptitude/sessions/{}", id),
        Some(&token("student-2", "student")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/aptitude/sessions/{}/answers", id),
        Some(&owner),
        Some(json!({"question_id": 99, "answer": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/aptitude/sessions/{}", id),
        Some(&owner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/aptitude/sessions/{}", id),
        Some(&owner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
