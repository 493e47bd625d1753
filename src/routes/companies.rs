use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension,
};

use crate::{
    dto::envelope::ApiResponse,
    error::Result,
    middleware::auth::AuthContext,
    routes::backend_as,
    services::{company_service::CompanyService, job_service::JobService},
    AppState,
};

#[axum::debug_handler]
pub async fn list_companies(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<impl IntoResponse> {
    let companies = CompanyService::new(backend_as(&state, &auth)).list().await;
    Ok(ApiResponse::from(companies))
}

#[axum::debug_handler]
pub async fn get_company(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let company = CompanyService::new(backend_as(&state, &auth))
        .get(&id)
        .await
        .into_result()?;
    Ok(ApiResponse::ok(company))
}

#[axum::debug_handler]
pub async fn list_company_jobs(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let jobs = JobService::new(backend_as(&state, &auth))
        .list_by_company(&id)
        .await
        .into_result()?;
    Ok(ApiResponse::ok(jobs))
}
