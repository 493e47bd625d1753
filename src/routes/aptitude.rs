use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::aptitude_dto::{
        AnswerPayload, GenerateTestPayload, GenerationSummary, InsightsResponse, NavigatePayload,
        StartSessionPayload, StartSessionResponse,
    },
    dto::envelope::ApiResponse,
    error::{Error, Result},
    middleware::auth::AuthContext,
    services::ai_service::GenerationOutput,
    services::session_service::StartSession,
    AppState,
};

async fn generate(state: &AppState, payload: &GenerateTestPayload) -> Result<GenerationOutput> {
    payload.validate()?;
    let minutes = payload
        .duration_minutes
        .unwrap_or(state.config.default_test_minutes);
    let mut out = state.ai_service.generate_test(&payload.context(), minutes).await;
    if let Some(minutes) = payload.duration_minutes {
        out.test.duration = minutes;
    }
    Ok(out)
}

/// Full test including the answer key, for companies preparing a test.
#[axum::debug_handler]
pub async fn generate_test(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<GenerateTestPayload>,
) -> Result<impl IntoResponse> {
    auth.ensure_role(&["company"])?;
    let out = generate(&state, &payload).await?;
    Ok(ApiResponse::ok(out))
}

#[axum::debug_handler]
pub async fn start_session(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<StartSessionPayload>,
) -> Result<impl IntoResponse> {
    auth.ensure_role(&["student"])?;
    let StartSessionPayload {
        test,
        generate: context,
        job_id,
        application_id,
    } = payload;

    let (test, generation, job_id, application_id) = match (test, context) {
        (Some(mut test), None) => {
            // a caller-written test carries its own answer key
            if !auth.claims.is_admin() {
                return Err(Error::Forbidden(
                    "Students start sessions from a generated test".to_string(),
                ));
            }
            test.recompute_total_points();
            (test, None, job_id, application_id)
        }
        (None, Some(context)) => {
            let out = generate(&state, &context).await?;
            let summary = GenerationSummary::from(&out);
            (
                out.test,
                Some(summary),
                job_id.or(context.job_id),
                application_id.or(context.application_id),
            )
        }
        _ => {
            return Err(Error::BadRequest(
                "Provide either a test or a generation context".to_string(),
            ))
        }
    };

    let session = state.sessions.start(StartSession {
        student_id: auth.user_id().to_string(),
        job_id,
        application_id,
        test,
    })?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(StartSessionResponse {
            session,
            generation,
        }),
    ))
}

#[axum::debug_handler]
pub async fn get_session(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    Ok(ApiResponse::ok(state.sessions.snapshot(id, auth.user_id())?))
}

#[axum::debug_handler]
pub async fn delete_session(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.sessions.abandon(id, auth.user_id())?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn save_answer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AnswerPayload>,
) -> Result<impl IntoResponse> {
    let snapshot = state
        .sessions
        .answer(id, auth.user_id(), payload.question_id, payload.answer)?;
    Ok(ApiResponse::ok(snapshot))
}

#[axum::debug_handler]
pub async fn navigate(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<NavigatePayload>,
) -> Result<impl IntoResponse> {
    let snapshot = state
        .sessions
        .navigate(id, auth.user_id(), payload.navigation()?)?;
    Ok(ApiResponse::ok(snapshot))
}

#[axum::debug_handler]
pub async fn submit(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let result = state.sessions.submit(id, auth.user_id()).await?;
    Ok(ApiResponse::ok(result))
}

#[axum::debug_handler]
pub async fn history(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<impl IntoResponse> {
    let records = state.history.list_for_student(auth.user_id()).await?;
    Ok(ApiResponse::ok(records))
}

#[axum::debug_handler]
pub async fn get_result(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let record = state.history.get(id).await?;
    auth.ensure_self_or_admin(&record.student_id)?;
    Ok(ApiResponse::ok(record))
}

#[axum::debug_handler]
pub async fn insights(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let record = state.history.get(id).await?;
    auth.ensure_self_or_admin(&record.student_id)?;
    let result = record.to_result()?;
    let questions = record.questions()?;

    let response = match state
        .ai_service
        .test_insights(&record.test_title, &questions, &result)
        .await
    {
        Some(text) => InsightsResponse {
            insights: text,
            canned: false,
        },
        None => InsightsResponse {
            insights: format!(
                "{}\n\n{}\n\n{}",
                result.feedback.title,
                result.feedback.message,
                result
                    .feedback
                    .recommendations
                    .iter()
                    .map(|r| format!("- {}", r))
                    .collect::<Vec<_>>()
                    .join("\n")
            ),
            canned: true,
        },
    };
    Ok(ApiResponse::ok(response))
}
