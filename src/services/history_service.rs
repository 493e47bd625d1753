use crate::error::Result;
use crate::models::test_history::{NewSubmission, TestHistoryRecord};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Where finished test sessions are recorded.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn save(&self, submission: &NewSubmission) -> Result<TestHistoryRecord>;
    async fn list_for_student(&self, student_id: &str) -> Result<Vec<TestHistoryRecord>>;
    async fn get(&self, id: Uuid) -> Result<TestHistoryRecord>;
}

#[derive(Clone)]
pub struct PgHistoryStore {
    pool: PgPool,
}

impl PgHistoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const RETURNING: &str = r#"
    id, session_id, student_id, job_id, application_id, test_title,
    score, earned_points, total_points, feedback_tier,
    questions, answers, graded_answers, auto_submitted, time_spent_seconds,
    started_at, completed_at
"#;

#[async_trait]
impl SubmissionStore for PgHistoryStore {
    async fn save(&self, s: &NewSubmission) -> Result<TestHistoryRecord> {
        let sql = format!(
            r#"
            INSERT INTO test_submissions (
                session_id, student_id, job_id, application_id, test_title,
                score, earned_points, total_points, feedback_tier,
                questions, answers, graded_answers, auto_submitted, time_spent_seconds,
                started_at, completed_at
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16)
            ON CONFLICT (session_id) DO NOTHING
            RETURNING {}
            "#,
            RETURNING
        );
        let record = sqlx::query_as::<_, TestHistoryRecord>(&sql)
            .bind(s.session_id)
            .bind(&s.student_id)
            .bind(&s.job_id)
            .bind(&s.application_id)
            .bind(&s.test_title)
            .bind(s.score)
            .bind(s.earned_points)
            .bind(s.total_points)
            .bind(&s.feedback_tier)
            .bind(&s.questions)
            .bind(&s.answers)
            .bind(&s.graded_answers)
            .bind(s.auto_submitted)
            .bind(s.time_spent_seconds)
            .bind(s.started_at)
            .bind(s.completed_at)
            .fetch_optional(&self.pool)
            .await?;

        match record {
            Some(r) => Ok(r),
            // the session was already recorded; hand back the stored row
            None => {
                let sql = format!(
                    "SELECT {} FROM test_submissions WHERE session_id = $1",
                    RETURNING
                );
                Ok(sqlx::query_as::<_, TestHistoryRecord>(&sql)
                    .bind(s.session_id)
                    .fetch_one(&self.pool)
                    .await?)
            }
        }
    }

    async fn list_for_student(&self, student_id: &str) -> Result<Vec<TestHistoryRecord>> {
        let sql = format!(
            "SELECT {} FROM test_submissions WHERE student_id = $1 ORDER BY completed_at DESC",
            RETURNING
        );
        let rows = sqlx::query_as::<_, TestHistoryRecord>(&sql)
            .bind(student_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get(&self, id: Uuid) -> Result<TestHistoryRecord> {
        let sql = format!("SELECT {} FROM test_submissions WHERE id = $1", RETURNING);
        let row = sqlx::query_as::<_, TestHistoryRecord>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }
}
