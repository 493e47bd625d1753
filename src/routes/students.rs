use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension,
};

use crate::{
    dto::envelope::ApiResponse, error::Result, middleware::auth::AuthContext,
    routes::backend_as, services::student_service::StudentService, AppState,
};

#[axum::debug_handler]
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(student_id): Path<String>,
) -> Result<impl IntoResponse> {
    auth.ensure_self_or_admin(&student_id)?;
    let dashboard = StudentService::new(backend_as(&state, &auth), state.history.clone())
        .dashboard(&student_id)
        .await;
    Ok(ApiResponse::ok(dashboard))
}
