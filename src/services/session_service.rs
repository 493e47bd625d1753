use crate::error::{Error, Result};
use crate::models::aptitude_test::AptitudeTest;
use crate::models::question::{AnswerValue, PublicQuestion};
use crate::models::submission::{AnswerSheet, TestResult};
use crate::models::test_history::NewSubmission;
use crate::services::grading_service::GradingService;
use crate::services::history_service::SubmissionStore;
use crate::utils::time::{elapsed_seconds, now};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::AbortHandle;
use tokio::time::{interval_at, Instant};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Submitted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTrigger {
    Manual,
    Timeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Next,
    Previous,
    To(usize),
}

#[derive(Debug, Clone)]
pub struct StartSession {
    pub student_id: String,
    pub job_id: Option<String>,
    pub application_id: Option<String>,
    pub test: AptitudeTest,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub student_id: String,
    pub job_id: Option<String>,
    pub status: SessionStatus,
    pub title: String,
    pub description: Option<String>,
    pub total_questions: usize,
    pub current_index: usize,
    pub current_question: Option<PublicQuestion>,
    pub questions: Vec<PublicQuestion>,
    pub answers: AnswerSheet,
    pub answered_count: usize,
    pub duration_seconds: u32,
    pub remaining_seconds: u32,
    pub started_at: DateTime<Utc>,
    pub auto_submitted: bool,
    pub result: Option<TestResult>,
}

struct TestSession {
    id: Uuid,
    student_id: String,
    job_id: Option<String>,
    application_id: Option<String>,
    test: AptitudeTest,
    current_index: usize,
    answers: AnswerSheet,
    duration_seconds: u32,
    remaining_seconds: u32,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    status: SessionStatus,
    auto_submitted: bool,
    result: Option<TestResult>,
    timer: Option<AbortHandle>,
}

impl TestSession {
    /// Every question id, with `None` for the ones never answered.
    fn full_answer_sheet(&self) -> AnswerSheet {
        self.test
            .questions
            .iter()
            .map(|q| (q.id, self.answers.get(&q.id).cloned().flatten()))
            .collect()
    }

    fn ensure_active(&self) -> Result<()> {
        match self.status {
            SessionStatus::Active => Ok(()),
            SessionStatus::Submitted => Err(Error::Conflict(
                "This test has already been submitted".to_string(),
            )),
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        let questions: Vec<PublicQuestion> =
            self.test.questions.iter().map(PublicQuestion::from).collect();
        SessionSnapshot {
            id: self.id,
            student_id: self.student_id.clone(),
            job_id: self.job_id.clone(),
            status: self.status,
            title: self.test.title.clone(),
            description: self.test.description.clone(),
            total_questions: questions.len(),
            current_index: self.current_index,
            current_question: questions.get(self.current_index).cloned(),
            answered_count: self.answers.values().filter(|a| a.is_some()).count(),
            answers: self.answers.clone(),
            questions,
            duration_seconds: self.duration_seconds,
            remaining_seconds: self.remaining_seconds,
            started_at: self.started_at,
            auto_submitted: self.auto_submitted,
            result: self.result.clone(),
        }
    }
}

/// Live test sessions, one countdown task each.
#[derive(Clone)]
pub struct SessionService {
    sessions: Arc<Mutex<HashMap<Uuid, TestSession>>>,
    store: Arc<dyn SubmissionStore>,
}

impl SessionService {
    pub fn new(store: Arc<dyn SubmissionStore>) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            store,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, TestSession>> {
        self.sessions.lock().expect("session registry mutex poisoned")
    }

    /// Registers a session and starts its countdown. Must run inside a
    /// tokio runtime.
    pub fn start(&self, req: StartSession) -> Result<SessionSnapshot> {
        if req.test.questions.is_empty() {
            return Err(Error::BadRequest("The test has no questions".to_string()));
        }
        let duration_seconds = req.test.duration_seconds();
        if duration_seconds == 0 {
            return Err(Error::BadRequest(
                "The test duration must be at least one minute".to_string(),
            ));
        }

        let id = Uuid::new_v4();
        let session = TestSession {
            id,
            student_id: req.student_id,
            job_id: req.job_id,
            application_id: req.application_id,
            test: req.test,
            current_index: 0,
            answers: AnswerSheet::new(),
            duration_seconds,
            remaining_seconds: duration_seconds,
            started_at: now(),
            completed_at: None,
            status: SessionStatus::Active,
            auto_submitted: false,
            result: None,
            timer: None,
        };

        let mut sessions = self.lock();
        sessions.insert(id, session);
        let handle = tokio::spawn(self.clone().run_countdown(id));
        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| Error::Internal("session vanished during start".to_string()))?;
        session.timer = Some(handle.abort_handle());

        tracing::info!(
            session_id = %id,
            student_id = %session.student_id,
            questions = session.test.questions.len(),
            duration_seconds,
            "test session started"
        );
        Ok(session.snapshot())
    }

    pub fn snapshot(&self, id: Uuid, student_id: &str) -> Result<SessionSnapshot> {
        self.with_session(id, student_id, |s| Ok(s.snapshot()))
    }

    pub fn answer(
        &self,
        id: Uuid,
        student_id: &str,
        question_id: i32,
        answer: Option<AnswerValue>,
    ) -> Result<SessionSnapshot> {
        self.with_session(id, student_id, |s| {
            s.ensure_active()?;
            if !s.test.questions.iter().any(|q| q.id == question_id) {
                return Err(Error::BadRequest(format!(
                    "Question {} is not part of this test",
                    question_id
                )));
            }
            s.answers.insert(question_id, answer);
            Ok(s.snapshot())
        })
    }

    pub fn navigate(&self, id: Uuid, student_id: &str, to: Navigation) -> Result<SessionSnapshot> {
        self.with_session(id, student_id, |s| {
            s.ensure_active()?;
            let last = s.test.questions.len().saturating_sub(1);
            s.current_index = match to {
                Navigation::Next => (s.current_index + 1).min(last),
                Navigation::Previous => s.current_index.saturating_sub(1),
                Navigation::To(index) => index.min(last),
            };
            Ok(s.snapshot())
        })
    }

    pub async fn submit(&self, id: Uuid, student_id: &str) -> Result<TestResult> {
        self.with_session(id, student_id, |_| Ok(()))?;
        self.finalize(id, SubmitTrigger::Manual).await
    }

    /// Drops a session and stops its countdown without submitting.
    pub fn abandon(&self, id: Uuid, student_id: &str) -> Result<()> {
        self.with_session(id, student_id, |_| Ok(()))?;
        if let Some(session) = self.lock().remove(&id) {
            if let Some(timer) = session.timer {
                timer.abort();
            }
            tracing::info!(session_id = %id, status = ?session.status, "test session discarded");
        }
        Ok(())
    }

    /// Forgets submitted sessions finished more than `max_age` ago.
    pub fn purge_finished(&self, max_age: chrono::Duration) -> usize {
        let cutoff = now() - max_age;
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, s| match (s.status, s.completed_at) {
            (SessionStatus::Submitted, Some(done)) => done > cutoff,
            _ => true,
        });
        before - sessions.len()
    }

    pub fn active_count(&self) -> usize {
        self.lock()
            .values()
            .filter(|s| s.status == SessionStatus::Active)
            .count()
    }

    fn with_session<R>(
        &self,
        id: Uuid,
        student_id: &str,
        f: impl FnOnce(&mut TestSession) -> Result<R>,
    ) -> Result<R> {
        let mut sessions = self.lock();
        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound("Test session not found".to_string()))?;
        if session.student_id != student_id {
            return Err(Error::Forbidden(
                "This test session belongs to another student".to_string(),
            ));
        }
        f(session)
    }

    async fn run_countdown(self, id: Uuid) {
        let period = Duration::from_secs(1);
        let mut ticker = interval_at(Instant::now() + period, period);
        loop {
            ticker.tick().await;
            let expired = {
                let mut sessions = self.lock();
                match sessions.get_mut(&id) {
                    Some(s) if s.status == SessionStatus::Active => {
                        s.remaining_seconds = s.remaining_seconds.saturating_sub(1);
                        s.remaining_seconds == 0
                    }
                    _ => return,
                }
            };
            if expired {
                match self.finalize(id, SubmitTrigger::Timeout).await {
                    Ok(result) => {
                        tracing::info!(session_id = %id, score = result.score, "test auto-submitted on timeout")
                    }
                    Err(e) => tracing::warn!(session_id = %id, error = %e, "timeout submission skipped"),
                }
                return;
            }
        }
    }

    /// Grades and records a session. Only the first caller gets through;
    /// later ones see `Conflict`.
    async fn finalize(&self, id: Uuid, trigger: SubmitTrigger) -> Result<TestResult> {
        let (submission, mut result, timer) = {
            let mut sessions = self.lock();
            let session = sessions
                .get_mut(&id)
                .ok_or_else(|| Error::NotFound("Test session not found".to_string()))?;
            session.ensure_active()?;

            let sheet = session.full_answer_sheet();
            let result = GradingService::grade(&session.test.questions, &sheet);
            let questions = serde_json::to_value(&session.test.questions)?;
            let answers = serde_json::to_value(&sheet)?;
            let graded_answers = serde_json::to_value(&result.graded)?;
            let completed_at = now();

            session.status = SessionStatus::Submitted;
            session.auto_submitted = trigger == SubmitTrigger::Timeout;
            if session.auto_submitted {
                session.remaining_seconds = 0;
            }
            session.completed_at = Some(completed_at);
            session.result = Some(result.clone());

            // the countdown is authoritative; wall clock only covers a stalled timer
            let counted = session.duration_seconds - session.remaining_seconds;
            let wall = elapsed_seconds(session.started_at, completed_at)
                .min(session.duration_seconds as i64) as u32;
            let time_spent = counted.max(wall);

            let submission = NewSubmission {
                session_id: session.id,
                student_id: session.student_id.clone(),
                job_id: session.job_id.clone(),
                application_id: session.application_id.clone(),
                test_title: session.test.title.clone(),
                score: Decimal::from(result.score),
                earned_points: result.earned_points as i32,
                total_points: result.total_points as i32,
                feedback_tier: result.feedback.tier.as_str().to_string(),
                questions,
                answers,
                graded_answers,
                auto_submitted: session.auto_submitted,
                time_spent_seconds: time_spent as i32,
                started_at: session.started_at,
                completed_at,
            };
            (submission, result, session.timer.take())
        };

        if trigger == SubmitTrigger::Manual {
            if let Some(timer) = timer {
                timer.abort();
            }
        }

        match self.store.save(&submission).await {
            Ok(record) => {
                result.submission_id = Some(record.id);
                if let Some(session) = self.lock().get_mut(&id) {
                    session.result = Some(result.clone());
                }
            }
            Err(e) => {
                tracing::error!(session_id = %id, error = %e, "failed to record test submission");
            }
        }

        tracing::info!(
            session_id = %id,
            score = result.score,
            tier = result.feedback.tier.as_str(),
            trigger = ?trigger,
            "test session submitted"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::{Question, QuestionType};
    use crate::models::test_history::TestHistoryRecord;
    use crate::services::history_service::MockSubmissionStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn record_for(s: &NewSubmission) -> TestHistoryRecord {
        TestHistoryRecord {
            id: Uuid::new_v4(),
            session_id: s.session_id,
            student_id: s.student_id.clone(),
            job_id: s.job_id.clone(),
            application_id: s.application_id.clone(),
            test_title: s.test_title.clone(),
            score: s.score,
            earned_points: s.earned_points,
            total_points: s.total_points,
            feedback_tier: s.feedback_tier.clone(),
            questions: s.questions.clone(),
            answers: s.answers.clone(),
            graded_answers: s.graded_answers.clone(),
            auto_submitted: s.auto_submitted,
            time_spent_seconds: s.time_spent_seconds,
            started_at: s.started_at,
            completed_at: s.completed_at,
        }
    }

    fn counting_store(expected: usize) -> (MockSubmissionStore, Arc<AtomicUsize>) {
        let saves = Arc::new(AtomicUsize::new(0));
        let counter = saves.clone();
        let mut store = MockSubmissionStore::new();
        store.expect_save().times(expected).returning(move |s| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(record_for(s))
        });
        (store, saves)
    }

    fn quiz(minutes: u32) -> AptitudeTest {
        let mut test = AptitudeTest {
            title: "Prueba".into(),
            description: None,
            questions: vec![
                Question {
                    id: 1,
                    question_type: QuestionType::MultipleChoice,
                    question: "2+2".into(),
                    options: Some(vec!["3".into(), "4".into()]),
                    correct_answer: Some(AnswerValue::Index(1)),
                    points: 10,
                    explanation: None,
                    language: None,
                },
                Question {
                    id: 2,
                    question_type: QuestionType::TrueFalse,
                    question: "El cielo es azul".into(),
                    options: None,
                    correct_answer: Some(AnswerValue::Bool(true)),
                    points: 10,
                    explanation: None,
                    language: None,
                },
            ],
            duration: minutes,
            total_points: 0,
        };
        test.recompute_total_points();
        test
    }

    fn start(svc: &SessionService, minutes: u32) -> SessionSnapshot {
        svc.start(StartSession {
            student_id: "student-1".into(),
            job_id: Some("job-1".into()),
            application_id: None,
            test: quiz(minutes),
        })
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_submits_exactly_once_on_timeout() {
        let (store, saves) = counting_store(1);
        let svc = SessionService::new(Arc::new(store));
        let snap = start(&svc, 1);
        assert_eq!(snap.remaining_seconds, 60);
        svc.answer(snap.id, "student-1", 1, Some(AnswerValue::Index(1)))
            .unwrap();

        tokio::time::sleep(Duration::from_millis(59_500)).await;
        let mid = svc.snapshot(snap.id, "student-1").unwrap();
        assert_eq!(mid.status, SessionStatus::Active);
        assert_eq!(mid.remaining_seconds, 1);
        assert_eq!(saves.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(1)).await;
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(saves.load(Ordering::SeqCst), 1);

        let done = svc.snapshot(snap.id, "student-1").unwrap();
        assert_eq!(done.status, SessionStatus::Submitted);
        assert!(done.auto_submitted);
        assert_eq!(done.remaining_seconds, 0);
        let result = done.result.unwrap();
        assert_eq!(result.score, 50);
        assert!(result.submission_id.is_some());

        let again = svc.submit(snap.id, "student-1").await;
        assert!(matches!(again, Err(Error::Conflict(_))));
        assert_eq!(saves.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn manual_submit_stops_the_countdown() {
        let (store, saves) = counting_store(1);
        let svc = SessionService::new(Arc::new(store));
        let snap = start(&svc, 1);

        tokio::time::sleep(Duration::from_millis(10_500)).await;
        svc.answer(snap.id, "student-1", 1, Some(AnswerValue::Index(1)))
            .unwrap();
        svc.answer(snap.id, "student-1", 2, Some(AnswerValue::Bool(true)))
            .unwrap();
        let result = svc.submit(snap.id, "student-1").await.unwrap();
        assert_eq!(result.score, 100);

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(saves.load(Ordering::SeqCst), 1);
        let done = svc.snapshot(snap.id, "student-1").unwrap();
        assert!(!done.auto_submitted);
        assert_eq!(done.remaining_seconds, 50);
        assert_eq!(svc.active_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn navigation_is_clamped_and_answers_are_validated() {
        let (store, _) = counting_store(0);
        let svc = SessionService::new(Arc::new(store));
        let snap = start(&svc, 5);
        assert_eq!(snap.current_index, 0);
        assert!(snap.current_question.is_some());

        let prev = svc.navigate(snap.id, "student-1", Navigation::Previous).unwrap();
        assert_eq!(prev.current_index, 0);
        let next = svc.navigate(snap.id, "student-1", Navigation::Next).unwrap();
        assert_eq!(next.current_index, 1);
        let past_end = svc.navigate(snap.id, "student-1", Navigation::Next).unwrap();
        assert_eq!(past_end.current_index, 1);
        let jump = svc.navigate(snap.id, "student-1", Navigation::To(99)).unwrap();
        assert_eq!(jump.current_index, 1);

        let unknown = svc.answer(snap.id, "student-1", 42, Some(AnswerValue::Index(0)));
        assert!(matches!(unknown, Err(Error::BadRequest(_))));
        let cleared = svc.answer(snap.id, "student-1", 2, None).unwrap();
        assert_eq!(cleared.answered_count, 0);

        let stranger = svc.snapshot(snap.id, "student-2");
        assert!(matches!(stranger, Err(Error::Forbidden(_))));

        svc.abandon(snap.id, "student-1").unwrap();
        assert!(matches!(
            svc.snapshot(snap.id, "student-1"),
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn store_failure_still_returns_result() {
        let mut store = MockSubmissionStore::new();
        store
            .expect_save()
            .times(1)
            .returning(|_| Err(Error::Internal("database down".into())));
        let svc = SessionService::new(Arc::new(store));
        let snap = start(&svc, 1);
        let result = svc.submit(snap.id, "student-1").await.unwrap();
        assert_eq!(result.score, 0);
        assert!(result.submission_id.is_none());
        assert_eq!(result.graded.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_tests_are_rejected() {
        let (store, _) = counting_store(0);
        let svc = SessionService::new(Arc::new(store));
        let mut test = quiz(1);
        test.questions.clear();
        let res = svc.start(StartSession {
            student_id: "s".into(),
            job_id: None,
            application_id: None,
            test,
        });
        assert!(matches!(res, Err(Error::BadRequest(_))));
    }
}
