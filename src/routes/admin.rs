use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use validator::Validate;

use crate::{
    dto::admin_dto::{AccountKind, CreateAnnouncementPayload, ModerationPayload},
    dto::envelope::ApiResponse,
    error::Result,
    middleware::auth::AuthContext,
    routes::backend_as,
    services::admin_service::AdminService,
    services::report_service::{report_filename, ReportService},
    AppState,
};

#[axum::debug_handler]
pub async fn stats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<impl IntoResponse> {
    let stats = AdminService::new(backend_as(&state, &auth)).stats_or_demo().await;
    Ok(ApiResponse::from(stats))
}

#[axum::debug_handler]
pub async fn export_report(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<impl IntoResponse> {
    let bytes = ReportService::new(backend_as(&state, &auth), state.config.report_max_attempts)
        .export_xlsx()
        .await?;
    let filename = report_filename(chrono::Utc::now());
    Ok((
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    ))
}

#[axum::debug_handler]
pub async fn list_announcements(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<impl IntoResponse> {
    let announcements = AdminService::new(backend_as(&state, &auth))
        .announcements()
        .await;
    Ok(ApiResponse::from(announcements))
}

#[axum::debug_handler]
pub async fn create_announcement(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<CreateAnnouncementPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let announcement = AdminService::new(backend_as(&state, &auth))
        .create_announcement(&payload)
        .await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(announcement)))
}

#[axum::debug_handler]
pub async fn moderate(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((kind, id)): Path<(AccountKind, String)>,
    Json(payload): Json<ModerationPayload>,
) -> Result<impl IntoResponse> {
    let result = AdminService::new(backend_as(&state, &auth))
        .moderate(kind, &id, &payload)
        .await?;
    Ok(ApiResponse::ok(result))
}
