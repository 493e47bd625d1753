use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use validator::Validate;

use crate::{
    dto::envelope::ApiResponse,
    dto::job_dto::{CreateJobPayload, UpdateJobPayload},
    error::Result,
    middleware::auth::AuthContext,
    models::job::JobFilter,
    routes::backend_as,
    services::job_service::JobService,
    AppState,
};

#[axum::debug_handler]
pub async fn list_jobs(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(filter): Query<JobFilter>,
) -> Result<impl IntoResponse> {
    let jobs = JobService::new(backend_as(&state, &auth)).list(&filter).await;
    Ok(ApiResponse::from(jobs))
}

#[axum::debug_handler]
pub async fn get_job(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let job = JobService::new(backend_as(&state, &auth))
        .get(&id)
        .await
        .into_result()?;
    Ok(ApiResponse::ok(job))
}

#[axum::debug_handler]
pub async fn create_job(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<CreateJobPayload>,
) -> Result<impl IntoResponse> {
    auth.ensure_role(&["company"])?;
    payload.validate()?;
    let job = JobService::new(backend_as(&state, &auth)).create(&payload).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(job)))
}

#[axum::debug_handler]
pub async fn update_job(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateJobPayload>,
) -> Result<impl IntoResponse> {
    auth.ensure_role(&["company"])?;
    payload.validate()?;
    let job = JobService::new(backend_as(&state, &auth))
        .update(&id, &payload)
        .await?;
    Ok(ApiResponse::ok(job))
}

#[axum::debug_handler]
pub async fn delete_job(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    auth.ensure_role(&["company"])?;
    JobService::new(backend_as(&state, &auth)).delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
