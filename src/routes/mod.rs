pub mod admin;
pub mod applications;
pub mod aptitude;
pub mod companies;
pub mod cv;
pub mod external_jobs;
pub mod health;
pub mod jobs;
pub mod students;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::middleware::{
    auth::{require_admin, require_bearer_auth, AuthContext},
    cors::cors_layer,
    rate_limit::{rps_middleware, RateLimiter},
};
use crate::services::backend_service::BackendClient;
use crate::AppState;

/// The backend client acting with the caller's token.
pub fn backend_as(state: &AppState, auth: &AuthContext) -> BackendClient {
    state.backend.with_bearer(Some(&auth.token))
}

pub fn build_router(state: AppState) -> Router {
    let ai_routes = Router::new()
        .route("/api/aptitude/generate", post(aptitude::generate_test))
        .route("/api/aptitude/sessions", post(aptitude::start_session))
        .route(
            "/api/aptitude/results/:id/insights",
            post(aptitude::insights),
        )
        .route_layer(from_fn_with_state(
            RateLimiter::new(state.config.ai_rps),
            rps_middleware,
        ));

    let admin_routes = Router::new()
        .route("/api/admin/stats", get(admin::stats))
        .route("/api/admin/reports/export", get(admin::export_report))
        .route(
            "/api/admin/announcements",
            get(admin::list_announcements).post(admin::create_announcement),
        )
        .route("/api/admin/moderation/:kind/:id", post(admin::moderate))
        .route_layer(from_fn(require_admin));

    let api = Router::new()
        .route("/api/jobs", get(jobs::list_jobs).post(jobs::create_job))
        .route(
            "/api/jobs/:id",
            get(jobs::get_job)
                .patch(jobs::update_job)
                .delete(jobs::delete_job),
        )
        .route("/api/companies", get(companies::list_companies))
        .route("/api/companies/:id", get(companies::get_company))
        .route("/api/companies/:id/jobs", get(companies::list_company_jobs))
        .route(
            "/api/applications",
            get(applications::list_applications).post(applications::apply),
        )
        .route("/api/applications/:id", get(applications::get_application))
        .route(
            "/api/applications/:id/status",
            patch(applications::update_status),
        )
        .route(
            "/api/applications/:id/withdraw",
            post(applications::withdraw),
        )
        .route(
            "/api/applications/:id/history",
            get(applications::history),
        )
        .route("/api/students/:id/dashboard", get(students::dashboard))
        .route(
            "/api/aptitude/sessions/:id",
            get(aptitude::get_session).delete(aptitude::delete_session),
        )
        .route(
            "/api/aptitude/sessions/:id/answers",
            put(aptitude::save_answer),
        )
        .route(
            "/api/aptitude/sessions/:id/navigate",
            post(aptitude::navigate),
        )
        .route("/api/aptitude/sessions/:id/submit", post(aptitude::submit))
        .route("/api/aptitude/history", get(aptitude::history))
        .route("/api/aptitude/results/:id", get(aptitude::get_result))
        .route("/api/cv/:student_id", get(cv::get_cv).patch(cv::update_section))
        .route("/api/cv/:student_id/reset", post(cv::reset))
        .route("/api/cv/:student_id/save", post(cv::save))
        .route("/api/cv/:student_id/share", post(cv::share))
        .route(
            "/api/external-jobs",
            get(external_jobs::list_external_jobs),
        )
        .merge(ai_routes)
        .merge(admin_routes)
        .route_layer(from_fn_with_state(state.clone(), require_bearer_auth))
        .route_layer(from_fn_with_state(
            RateLimiter::new(state.config.api_rps),
            rps_middleware,
        ));

    Router::new()
        .route("/health", get(health::health))
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.allowed_origins))
        .with_state(state)
}
