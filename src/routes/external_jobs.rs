use axum::{
    extract::{Query, State},
    response::IntoResponse,
};

use crate::{
    dto::envelope::ApiResponse, error::Result,
    services::external_jobs_service::ExternalJobQuery, AppState,
};

#[axum::debug_handler]
pub async fn list_external_jobs(
    State(state): State<AppState>,
    Query(query): Query<ExternalJobQuery>,
) -> Result<impl IntoResponse> {
    let jobs = state.external_jobs.search(&query).await;
    Ok(ApiResponse::from(jobs))
}
