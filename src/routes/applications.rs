use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use validator::Validate;

use crate::{
    dto::application_dto::{ApplicationListQuery, ApplyPayload, UpdateStatusPayload},
    dto::envelope::ApiResponse,
    error::{Error, Result},
    middleware::auth::AuthContext,
    routes::backend_as,
    services::application_service::ApplicationService,
    AppState,
};

#[axum::debug_handler]
pub async fn apply(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<ApplyPayload>,
) -> Result<impl IntoResponse> {
    auth.ensure_role(&["student"])?;
    payload.validate()?;
    let application = ApplicationService::new(backend_as(&state, &auth))
        .apply(auth.user_id(), &payload)
        .await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(application)))
}

#[axum::debug_handler]
pub async fn list_applications(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ApplicationListQuery>,
) -> Result<axum::response::Response> {
    let service = ApplicationService::new(backend_as(&state, &auth));
    match (query.student_id.as_deref(), query.job_id.as_deref()) {
        (Some(student_id), _) => {
            auth.ensure_self_or_admin(student_id)?;
            let apps = service.list_for_student(student_id).await;
            Ok(ApiResponse::from(apps).into_response())
        }
        (None, Some(job_id)) => {
            auth.ensure_role(&["company"])?;
            let apps = service.list_for_job(job_id).await?;
            Ok(ApiResponse::ok(apps).into_response())
        }
        (None, None) => Err(Error::BadRequest(
            "Filter by student_id or job_id".to_string(),
        )),
    }
}

#[axum::debug_handler]
pub async fn get_application(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let application = ApplicationService::new(backend_as(&state, &auth))
        .get(&id)
        .await?;
    if !auth.claims.has_role("company") {
        auth.ensure_self_or_admin(&application.student_id)?;
    }
    Ok(ApiResponse::ok(application))
}

#[axum::debug_handler]
pub async fn update_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusPayload>,
) -> Result<impl IntoResponse> {
    auth.ensure_role(&["company"])?;
    let application = ApplicationService::new(backend_as(&state, &auth))
        .update_status(&id, &payload, auth.user_id())
        .await?;
    Ok(ApiResponse::ok(application))
}

#[axum::debug_handler]
pub async fn withdraw(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let application = ApplicationService::new(backend_as(&state, &auth))
        .withdraw(&id, auth.user_id())
        .await?;
    Ok(ApiResponse::ok(application))
}

#[axum::debug_handler]
pub async fn history(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let service = ApplicationService::new(backend_as(&state, &auth));
    if !auth.claims.has_role("company") {
        let application = service.get(&id).await?;
        auth.ensure_self_or_admin(&application.student_id)?;
    }
    let entries = service.history(&id).await?;
    Ok(ApiResponse::ok(entries))
}
