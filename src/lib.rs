pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::config::Config;
use crate::error::Result;
use crate::services::{
    ai_service::AIService,
    backend_service::BackendClient,
    cv_service::CvService,
    email_service::EmailService,
    external_jobs_service::ExternalJobsService,
    history_service::{PgHistoryStore, SubmissionStore},
    session_service::SessionService,
};
use reqwest::Client;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub backend: BackendClient,
    pub ai_service: AIService,
    pub sessions: SessionService,
    pub history: Arc<dyn SubmissionStore>,
    pub cv_service: CvService,
    pub email_service: EmailService,
    pub external_jobs: ExternalJobsService,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config) -> Result<Self> {
        let store: Arc<dyn SubmissionStore> = Arc::new(PgHistoryStore::new(pool.clone()));
        Self::with_store(pool, config, store)
    }

    /// Same as [`AppState::new`] with the submission store supplied.
    pub fn with_store(
        pool: PgPool,
        config: Config,
        history: Arc<dyn SubmissionStore>,
    ) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()?;

        let backend = BackendClient::new(&config.backend_api_url, http_client.clone())?;
        let ai_service = AIService::new(
            config.gemini_api_key.clone(),
            config.gemini_api_url.clone(),
            config.gemini_model.clone(),
            http_client.clone(),
        );
        let email_service = EmailService::new(
            config.email_api_url.clone(),
            config.email_api_key.clone(),
            config.email_from.clone(),
            http_client.clone(),
        );
        let external_jobs = ExternalJobsService::new(config.cors_proxy_url.clone(), http_client);
        let sessions = SessionService::new(history.clone());

        Ok(Self {
            pool,
            config: Arc::new(config),
            backend,
            ai_service,
            sessions,
            history,
            cv_service: CvService::new(),
            email_service,
            external_jobs,
        })
    }
}
