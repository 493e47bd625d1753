use crate::error::{Error, Result};
use crate::models::aptitude_test::{AptitudeTest, TestContext};
use crate::models::question::AnswerValue;
use crate::services::ai_service::GenerationOutput;
use crate::services::session_service::{Navigation, SessionSnapshot};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GenerateTestPayload {
    #[validate(length(min = 1, max = 200, message = "job_title is required"))]
    pub job_title: String,
    pub job_id: Option<String>,
    pub application_id: Option<String>,
    pub job_description: Option<String>,
    pub requirements: Option<String>,
    pub company_name: Option<String>,
    pub company_industry: Option<String>,
    #[validate(range(min = 1, max = 25))]
    pub question_count: Option<u32>,
    #[validate(range(min = 1, max = 240))]
    pub duration_minutes: Option<u32>,
}

impl GenerateTestPayload {
    pub fn context(&self) -> TestContext {
        TestContext {
            job_id: self.job_id.clone(),
            application_id: self.application_id.clone(),
            job_title: self.job_title.trim().to_string(),
            job_description: self.job_description.clone(),
            requirements: self.requirements.clone(),
            company_name: self.company_name.clone(),
            company_industry: self.company_industry.clone(),
            question_count: self.question_count,
        }
    }
}

/// Either a ready test or the context to generate one from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartSessionPayload {
    pub test: Option<AptitudeTest>,
    pub generate: Option<GenerateTestPayload>,
    pub job_id: Option<String>,
    pub application_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub used_fallback: bool,
    pub fallback_reason: Option<String>,
    pub logs: Vec<String>,
}

impl From<&GenerationOutput> for GenerationSummary {
    fn from(out: &GenerationOutput) -> Self {
        Self {
            used_fallback: out.used_fallback,
            fallback_reason: out.fallback_reason.clone(),
            logs: out.logs.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartSessionResponse {
    pub session: SessionSnapshot,
    pub generation: Option<GenerationSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerPayload {
    pub question_id: i32,
    pub answer: Option<AnswerValue>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NavigateDirection {
    Next,
    Previous,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigatePayload {
    pub direction: Option<NavigateDirection>,
    pub index: Option<usize>,
}

impl NavigatePayload {
    pub fn navigation(&self) -> Result<Navigation> {
        match (self.direction, self.index) {
            (Some(NavigateDirection::Next), None) => Ok(Navigation::Next),
            (Some(NavigateDirection::Previous), None) => Ok(Navigation::Previous),
            (None, Some(index)) => Ok(Navigation::To(index)),
            _ => Err(Error::BadRequest(
                "Provide either a direction or an index".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightsResponse {
    pub insights: String,
    /// The canned tier feedback was used because the model gave nothing.
    pub canned: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigation_needs_exactly_one_target() {
        let p = |direction, index| NavigatePayload { direction, index };
        assert_eq!(p(Some(NavigateDirection::Next), None).navigation().unwrap(), Navigation::Next);
        assert_eq!(p(None, Some(3)).navigation().unwrap(), Navigation::To(3));
        assert!(p(None, None).navigation().is_err());
        assert!(p(Some(NavigateDirection::Previous), Some(1)).navigation().is_err());
    }

    #[test]
    fn generate_payload_bounds() {
        let payload: GenerateTestPayload = serde_json::from_value(serde_json::json!({
            "job_title": "Backend Developer",
            "question_count": 40
        }))
        .unwrap();
        assert!(payload.validate().is_err());
        assert_eq!(payload.context().job_title, "Backend Developer");
    }
}
