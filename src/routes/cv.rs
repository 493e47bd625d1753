use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Extension, Json,
};
use validator::Validate;

use crate::{
    dto::cv_dto::{CvQuery, ShareCvPayload, ShareCvResponse, UpdateCvSectionPayload},
    dto::envelope::ApiResponse,
    error::{Error, Result},
    middleware::auth::AuthContext,
    routes::backend_as,
    services::email_service::cv_share_message,
    AppState,
};

#[axum::debug_handler]
pub async fn get_cv(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(student_id): Path<String>,
    Query(query): Query<CvQuery>,
) -> Result<impl IntoResponse> {
    auth.ensure_self_or_admin(&student_id)?;
    let view = state
        .cv_service
        .load(&backend_as(&state, &auth), &student_id, query.refresh.unwrap_or(false))
        .await?;
    Ok(ApiResponse::ok(view))
}

#[axum::debug_handler]
pub async fn update_section(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(student_id): Path<String>,
    Json(payload): Json<UpdateCvSectionPayload>,
) -> Result<impl IntoResponse> {
    auth.ensure_self_or_admin(&student_id)?;
    payload.validate()?;
    let view = state
        .cv_service
        .update_section(&backend_as(&state, &auth), &student_id, &payload.path, payload.value)
        .await?;
    Ok(ApiResponse::ok(view))
}

#[axum::debug_handler]
pub async fn reset(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(student_id): Path<String>,
) -> Result<impl IntoResponse> {
    auth.ensure_self_or_admin(&student_id)?;
    Ok(ApiResponse::ok(state.cv_service.reset(&student_id)?))
}

#[axum::debug_handler]
pub async fn save(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(student_id): Path<String>,
) -> Result<impl IntoResponse> {
    auth.ensure_self_or_admin(&student_id)?;
    let view = state
        .cv_service
        .save(&backend_as(&state, &auth), &student_id)
        .await?;
    Ok(ApiResponse::ok(view))
}

#[axum::debug_handler]
pub async fn share(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(student_id): Path<String>,
    Json(payload): Json<ShareCvPayload>,
) -> Result<impl IntoResponse> {
    auth.ensure_self_or_admin(&student_id)?;
    payload.validate()?;
    state
        .cv_service
        .load(&backend_as(&state, &auth), &student_id, false)
        .await?;
    let profile = state
        .cv_service
        .profile(&student_id)
        .ok_or_else(|| Error::NotFound("Student profile not found".to_string()))?;
    let cv_url = profile
        .cv_url
        .clone()
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| Error::BadRequest("Upload a CV before sharing it".to_string()))?;

    let name = match profile.full_name() {
        n if n.is_empty() => "Un estudiante".to_string(),
        n => n,
    };
    let message = cv_share_message(&payload.to, &name, &cv_url, payload.note.as_deref());
    let delivery = state.email_service.send(&message).await;
    Ok(ApiResponse::ok(ShareCvResponse { cv_url, delivery }))
}
