use crate::models::question::{AnswerValue, QuestionType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Answers keyed by question id; `None` marks a question left unanswered.
pub type AnswerSheet = BTreeMap<i32, Option<AnswerValue>>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackTier {
    Excellent,
    Good,
    Average,
    NeedsImprovement,
}

impl FeedbackTier {
    pub fn from_score(score: u32) -> Self {
        match score {
            s if s >= 90 => FeedbackTier::Excellent,
            s if s >= 70 => FeedbackTier::Good,
            s if s >= 50 => FeedbackTier::Average,
            _ => FeedbackTier::NeedsImprovement,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackTier::Excellent => "excellent",
            FeedbackTier::Good => "good",
            FeedbackTier::Average => "average",
            FeedbackTier::NeedsImprovement => "needs_improvement",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Feedback {
    pub tier: FeedbackTier,
    pub title: String,
    pub message: String,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GradedAnswer {
    pub question_id: i32,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub answer: Option<AnswerValue>,
    pub is_correct: bool,
    pub points_awarded: u32,
    pub max_points: u32,
    /// Correctness was decided by answer length, not by checking content.
    #[serde(default)]
    pub heuristic: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestResult {
    pub score: u32,
    pub earned_points: u32,
    pub total_points: u32,
    pub correct_count: usize,
    pub total_questions: usize,
    pub feedback: Feedback,
    pub graded: Vec<GradedAnswer>,
    #[serde(default)]
    pub submission_id: Option<Uuid>,
}
