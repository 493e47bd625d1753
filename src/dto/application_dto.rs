use crate::models::application::ApplicationStatus;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ApplyPayload {
    #[validate(length(min = 1, message = "job_id is required"))]
    pub job_id: String,
    #[validate(length(min = 1, message = "A cover letter is required"))]
    pub cover_letter: String,
    #[validate(url)]
    pub resume_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusPayload {
    pub status: ApplicationStatus,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplicationListQuery {
    pub student_id: Option<String>,
    pub job_id: Option<String>,
}
