use crate::services::email_service::EmailDelivery;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use validator::Validate;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CvQuery {
    pub refresh: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateCvSectionPayload {
    #[validate(length(min = 1, message = "path is required"))]
    pub path: String,
    pub value: JsonValue,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ShareCvPayload {
    #[validate(email)]
    pub to: String,
    #[validate(length(max = 1000))]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareCvResponse {
    pub cv_url: String,
    pub delivery: EmailDelivery,
}
