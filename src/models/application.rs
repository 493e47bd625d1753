use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Applied,
    Reviewed,
    Interview,
    TechnicalTest,
    FinalInterview,
    Accepted,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 8] = [
        ApplicationStatus::Applied,
        ApplicationStatus::Reviewed,
        ApplicationStatus::Interview,
        ApplicationStatus::TechnicalTest,
        ApplicationStatus::FinalInterview,
        ApplicationStatus::Accepted,
        ApplicationStatus::Rejected,
        ApplicationStatus::Withdrawn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Reviewed => "reviewed",
            ApplicationStatus::Interview => "interview",
            ApplicationStatus::TechnicalTest => "technical_test",
            ApplicationStatus::FinalInterview => "final_interview",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Withdrawn => "withdrawn",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "Applied",
            ApplicationStatus::Reviewed => "Under review",
            ApplicationStatus::Interview => "Interview",
            ApplicationStatus::TechnicalTest => "Technical test",
            ApplicationStatus::FinalInterview => "Final interview",
            ApplicationStatus::Accepted => "Accepted",
            ApplicationStatus::Rejected => "Rejected",
            ApplicationStatus::Withdrawn => "Withdrawn",
        }
    }

    /// No further stage changes are expected once an application reaches these.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Accepted | ApplicationStatus::Rejected | ApplicationStatus::Withdrawn
        )
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Application {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(alias = "jobId")]
    pub job_id: String,
    #[serde(alias = "studentId")]
    pub student_id: String,
    pub status: ApplicationStatus,
    #[serde(default, alias = "coverLetter")]
    pub cover_letter: Option<String>,
    #[serde(default, alias = "resumeUrl")]
    pub resume_url: Option<String>,
    #[serde(default, alias = "jobTitle")]
    pub job_title: Option<String>,
    #[serde(default, alias = "appliedAt")]
    pub applied_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "reviewedAt")]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "interviewAt")]
    pub interview_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "technicalTestAt")]
    pub technical_test_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "finalInterviewAt")]
    pub final_interview_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "decidedAt")]
    pub decided_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "updatedAt")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Application {
    /// Sets the status and stamps the timestamp belonging to that stage.
    pub fn advance(&mut self, status: ApplicationStatus, at: DateTime<Utc>) {
        self.status = status;
        self.updated_at = Some(at);
        *self.stage_slot(status) = Some(at);
    }

    pub fn stage_at(&self, status: ApplicationStatus) -> Option<DateTime<Utc>> {
        match status {
            ApplicationStatus::Applied => self.applied_at,
            ApplicationStatus::Reviewed => self.reviewed_at,
            ApplicationStatus::Interview => self.interview_at,
            ApplicationStatus::TechnicalTest => self.technical_test_at,
            ApplicationStatus::FinalInterview => self.final_interview_at,
            ApplicationStatus::Accepted
            | ApplicationStatus::Rejected
            | ApplicationStatus::Withdrawn => self.decided_at,
        }
    }

    fn stage_slot(&mut self, status: ApplicationStatus) -> &mut Option<DateTime<Utc>> {
        match status {
            ApplicationStatus::Applied => &mut self.applied_at,
            ApplicationStatus::Reviewed => &mut self.reviewed_at,
            ApplicationStatus::Interview => &mut self.interview_at,
            ApplicationStatus::TechnicalTest => &mut self.technical_test_at,
            ApplicationStatus::FinalInterview => &mut self.final_interview_at,
            ApplicationStatus::Accepted
            | ApplicationStatus::Rejected
            | ApplicationStatus::Withdrawn => &mut self.decided_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApplicationHistoryEntry {
    pub status: ApplicationStatus,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(alias = "changedAt")]
    pub changed_at: DateTime<Utc>,
    #[serde(default, alias = "changedBy")]
    pub changed_by: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_use_backend_spelling() {
        let json = serde_json::to_value(ApplicationStatus::TechnicalTest).unwrap();
        assert_eq!(json, "technical_test");
        let parsed: ApplicationStatus = serde_json::from_str("\"final_interview\"").unwrap();
        assert_eq!(parsed, ApplicationStatus::FinalInterview);
        for status in ApplicationStatus::ALL {
            assert_eq!(serde_json::to_value(status).unwrap(), status.as_str());
        }
    }

    #[test]
    fn advance_stamps_stage_timestamp() {
        let mut app: Application = serde_json::from_value(serde_json::json!({
            "id": "a1", "jobId": "j1", "studentId": "s1", "status": "applied"
        }))
        .unwrap();
        let now = Utc::now();
        app.advance(ApplicationStatus::Interview, now);
        assert_eq!(app.status, ApplicationStatus::Interview);
        assert_eq!(app.interview_at, Some(now));
        assert!(app.decided_at.is_none());
    }
}
