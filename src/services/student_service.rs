use crate::dto::envelope::Sourced;
use crate::models::application::{Application, ApplicationStatus};
use crate::models::job::{Job, JobFilter};
use crate::models::test_history::TestHistoryRecord;
use crate::services::application_service::ApplicationService;
use crate::services::backend_service::BackendClient;
use crate::services::history_service::SubmissionStore;
use crate::services::job_service::JobService;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

const RECENT_JOBS: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentDashboard {
    pub student_id: String,
    pub recent_jobs: Sourced<Vec<Job>>,
    pub applications: Sourced<Vec<Application>>,
    pub applications_by_status: BTreeMap<String, usize>,
    pub tests_taken: usize,
    pub average_score: Option<f64>,
    pub test_history: Vec<TestHistoryRecord>,
    /// Parts that could not be loaded.
    pub degraded: Vec<String>,
}

pub struct StudentService {
    backend: BackendClient,
    store: Arc<dyn SubmissionStore>,
}

impl StudentService {
    pub fn new(backend: BackendClient, store: Arc<dyn SubmissionStore>) -> Self {
        Self { backend, store }
    }

    pub async fn dashboard(&self, student_id: &str) -> StudentDashboard {
        let jobs = JobService::new(self.backend.clone());
        let applications = ApplicationService::new(self.backend.clone());
        let filter = JobFilter {
            active_only: Some(true),
            ..JobFilter::default()
        };

        let (mut recent_jobs, applications, history) = tokio::join!(
            jobs.list(&filter),
            applications.list_for_student(student_id),
            self.store.list_for_student(student_id),
        );

        let mut degraded = Vec::new();
        if recent_jobs.demo {
            degraded.push("jobs".to_string());
        }
        if applications.demo {
            degraded.push("applications".to_string());
        }
        let test_history = history.unwrap_or_else(|e| {
            tracing::warn!(student_id, error = %e, "test history unavailable for dashboard");
            degraded.push("test_history".to_string());
            Vec::new()
        });

        recent_jobs.data.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recent_jobs.data.truncate(RECENT_JOBS);

        StudentDashboard {
            student_id: student_id.to_string(),
            applications_by_status: count_by_status(&applications.data),
            tests_taken: test_history.len(),
            average_score: average_score(&test_history),
            recent_jobs,
            applications,
            test_history,
            degraded,
        }
    }
}

fn count_by_status(applications: &[Application]) -> BTreeMap<String, usize> {
    let mut counts: BTreeMap<String, usize> = ApplicationStatus::ALL
        .iter()
        .map(|s| (s.as_str().to_string(), 0))
        .collect();
    for app in applications {
        *counts.entry(app.status.as_str().to_string()).or_default() += 1;
    }
    counts
}

fn average_score(history: &[TestHistoryRecord]) -> Option<f64> {
    if history.is_empty() {
        return None;
    }
    let total: f64 = history.iter().filter_map(|r| r.score.to_f64()).sum();
    Some((total / history.len() as f64 * 10.0).round() / 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::mock_data;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn record(score: i64) -> TestHistoryRecord {
        TestHistoryRecord {
            id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            student_id: "s1".into(),
            job_id: None,
            application_id: None,
            test_title: "t".into(),
            score: Decimal::from(score),
            earned_points: 0,
            total_points: 0,
            feedback_tier: "good".into(),
            questions: serde_json::json!([]),
            answers: serde_json::json!({}),
            graded_answers: serde_json::json!([]),
            auto_submitted: false,
            time_spent_seconds: 0,
            started_at: Utc::now(),
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn averages_one_decimal() {
        assert_eq!(average_score(&[]), None);
        assert_eq!(average_score(&[record(70), record(85), record(90)]), Some(81.7));
    }

    #[test]
    fn counts_every_status() {
        let counts = count_by_status(&mock_data::applications_for_student("s1"));
        assert_eq!(counts.len(), ApplicationStatus::ALL.len());
        assert_eq!(counts["reviewed"], 1);
        assert_eq!(counts["applied"], 0);
    }
}
