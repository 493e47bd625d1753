use crate::error::Result;
use crate::models::question::Question;
use crate::models::submission::{GradedAnswer, TestResult};
use crate::services::grading_service::feedback_for;
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct TestHistoryRecord {
    pub id: Uuid,
    pub session_id: Uuid,
    pub student_id: String,
    pub job_id: Option<String>,
    pub application_id: Option<String>,
    pub test_title: String,
    pub score: Decimal,
    pub earned_points: i32,
    pub total_points: i32,
    pub feedback_tier: String,
    pub questions: JsonValue,
    pub answers: JsonValue,
    pub graded_answers: JsonValue,
    pub auto_submitted: bool,
    pub time_spent_seconds: i32,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl TestHistoryRecord {
    pub fn questions(&self) -> Result<Vec<Question>> {
        Ok(serde_json::from_value(self.questions.clone())?)
    }

    /// Rebuilds the graded result as it was returned on submission.
    pub fn to_result(&self) -> Result<TestResult> {
        let graded: Vec<GradedAnswer> = serde_json::from_value(self.graded_answers.clone())?;
        let score = self.score.round().to_u32().unwrap_or(0);
        Ok(TestResult {
            score,
            earned_points: self.earned_points.max(0) as u32,
            total_points: self.total_points.max(0) as u32,
            correct_count: graded.iter().filter(|g| g.is_correct).count(),
            total_questions: graded.len(),
            feedback: feedback_for(score),
            graded,
            submission_id: Some(self.id),
        })
    }
}

/// A finished session on its way into the history table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewSubmission {
    pub session_id: Uuid,
    pub student_id: String,
    pub job_id: Option<String>,
    pub application_id: Option<String>,
    pub test_title: String,
    pub score: Decimal,
    pub earned_points: i32,
    pub total_points: i32,
    pub feedback_tier: String,
    pub questions: JsonValue,
    pub answers: JsonValue,
    pub graded_answers: JsonValue,
    pub auto_submitted: bool,
    pub time_spent_seconds: i32,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}
