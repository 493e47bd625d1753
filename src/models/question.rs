use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Question {
    #[serde(default)]
    pub id: i32,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(alias = "text", alias = "prompt")]
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(
        default,
        rename = "correctAnswer",
        alias = "correct_answer",
        skip_serializing_if = "Option::is_none"
    )]
    pub correct_answer: Option<AnswerValue>,
    #[serde(default = "default_points")]
    pub points: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

pub fn default_points() -> u32 {
    10
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    Code,
    #[serde(alias = "short_answer", alias = "open")]
    Text,
}

/// An answer as the quiz taker submits it, or an answer key as the model
/// writes it: option index, boolean, or raw text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum AnswerValue {
    Bool(bool),
    Index(i64),
    Text(String),
}

impl AnswerValue {
    pub fn as_index(&self) -> Option<i64> {
        match self {
            AnswerValue::Index(i) => Some(*i),
            AnswerValue::Text(s) => s.trim().parse().ok(),
            AnswerValue::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AnswerValue::Bool(b) => Some(*b),
            AnswerValue::Text(s) => match s.trim().to_lowercase().as_str() {
                "true" | "verdadero" => Some(true),
                "false" | "falso" => Some(false),
                _ => None,
            },
            AnswerValue::Index(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AnswerValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// A question with its answer key removed, safe to hand to the quiz taker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublicQuestion {
    pub id: i32,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub points: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl From<&Question> for PublicQuestion {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id,
            question_type: q.question_type,
            question: q.question.clone(),
            options: q.options.clone(),
            points: q.points,
            language: q.language.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_model_style_question() {
        let q: Question = serde_json::from_value(serde_json::json!({
            "id": 3,
            "type": "true_false",
            "question": "Rust has a garbage collector",
            "correctAnswer": false
        }))
        .unwrap();
        assert_eq!(q.question_type, QuestionType::TrueFalse);
        assert_eq!(q.correct_answer, Some(AnswerValue::Bool(false)));
        assert_eq!(q.points, 10);
    }

    #[test]
    fn short_answer_is_text() {
        let t: QuestionType = serde_json::from_str("\"short_answer\"").unwrap();
        assert_eq!(t, QuestionType::Text);
    }

    #[test]
    fn public_question_hides_answer_key() {
        let q = Question {
            id: 1,
            question_type: QuestionType::MultipleChoice,
            question: "2+2?".into(),
            options: Some(vec!["3".into(), "4".into()]),
            correct_answer: Some(AnswerValue::Index(1)),
            points: 10,
            explanation: Some("arithmetic".into()),
            language: None,
        };
        let json = serde_json::to_value(PublicQuestion::from(&q)).unwrap();
        assert!(json.get("correctAnswer").is_none());
        assert!(json.get("explanation").is_none());
    }
}
