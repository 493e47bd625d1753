//! Turns a model's free-text reply into an [`AptitudeTest`].
//!
//! The reply is expected to be JSON, optionally wrapped in a markdown code
//! fence or surrounded by chatter. Anything unusable yields [`default_quiz`].

use crate::models::aptitude_test::AptitudeTest;
use crate::models::question::{default_points, AnswerValue, Question, QuestionType};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value as JsonValue;
use std::collections::HashSet;

static FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*)```").expect("fence regex")
});

pub const DEFAULT_QUIZ_MINUTES: u32 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedQuiz {
    pub test: AptitudeTest,
    /// Why the default quiz was used instead of the model output.
    pub fallback_reason: Option<String>,
}

impl ParsedQuiz {
    pub fn used_fallback(&self) -> bool {
        self.fallback_reason.is_some()
    }

    pub fn fallback(reason: impl Into<String>) -> Self {
        Self {
            test: default_quiz(),
            fallback_reason: Some(reason.into()),
        }
    }
}

pub fn default_quiz() -> AptitudeTest {
    AptitudeTest {
        title: "Prueba de aptitud general".to_string(),
        description: Some(
            "No se pudo generar una prueba personalizada; se usa una pregunta general."
                .to_string(),
        ),
        questions: vec![Question {
            id: 1,
            question_type: QuestionType::MultipleChoice,
            question: "¿Cuál es el propósito principal de un sistema de control de versiones como Git?"
                .to_string(),
            options: Some(vec![
                "Compilar el código más rápido".to_string(),
                "Registrar y coordinar los cambios en el código a lo largo del tiempo".to_string(),
                "Diseñar interfaces de usuario".to_string(),
                "Administrar servidores de bases de datos".to_string(),
            ]),
            correct_answer: Some(AnswerValue::Index(1)),
            points: 10,
            explanation: None,
            language: None,
        }],
        duration: DEFAULT_QUIZ_MINUTES,
        total_points: 10,
    }
}

/// Returns everything between the first opening fence and the last closing
/// fence, or the trimmed text when there is no fence. Fences nested inside
/// JSON strings stay part of the body.
pub fn strip_code_fences(text: &str) -> &str {
    match FENCED_BLOCK.captures(text).and_then(|c| c.get(1)) {
        Some(body) => body.as_str().trim(),
        None => text.trim(),
    }
}

/// Parses a model reply. Never fails: unusable input yields the default quiz
/// with a `fallback_reason`.
pub fn parse_quiz(raw: &str, default_title: &str, default_minutes: u32) -> ParsedQuiz {
    let body = strip_code_fences(raw);

    let value = match serde_json::from_str::<JsonValue>(body) {
        Ok(v) => v,
        Err(first_err) => {
            let recovered = [body, raw]
                .into_iter()
                .filter_map(outermost_object)
                .find_map(|candidate| serde_json::from_str::<JsonValue>(candidate).ok());
            match recovered {
                Some(v) => v,
                None => return ParsedQuiz::fallback(format!("reply is not JSON: {}", first_err)),
            }
        }
    };

    let Some(raw_questions) = value.get("questions").and_then(|q| q.as_array()) else {
        return ParsedQuiz::fallback("reply has no questions array");
    };

    let mut questions: Vec<Question> = raw_questions
        .iter()
        .enumerate()
        .filter_map(|(idx, q)| coerce_question(q, idx))
        .collect();

    if questions.is_empty() {
        return ParsedQuiz::fallback("reply contained no usable questions");
    }
    if questions.len() < raw_questions.len() {
        tracing::warn!(
            kept = questions.len(),
            received = raw_questions.len(),
            "dropped malformed questions from model reply"
        );
    }

    let mut seen = HashSet::new();
    if !questions.iter().all(|q| seen.insert(q.id)) {
        for (idx, q) in questions.iter_mut().enumerate() {
            q.id = idx as i32 + 1;
        }
    }

    let title = value
        .get("title")
        .and_then(|t| t.as_str())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(default_title)
        .to_string();
    let description = value
        .get("description")
        .and_then(|d| d.as_str())
        .map(str::to_string);
    let duration = value
        .get("duration")
        .or_else(|| value.get("durationMinutes"))
        .or_else(|| value.get("duration_minutes"))
        .and_then(|d| d.as_u64())
        .filter(|d| *d > 0)
        .map(|d| d.min(240) as u32)
        .unwrap_or(default_minutes.max(1));

    let mut test = AptitudeTest {
        title,
        description,
        questions,
        duration,
        total_points: 0,
    };
    test.recompute_total_points();

    ParsedQuiz {
        test,
        fallback_reason: None,
    }
}

fn outermost_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn coerce_question(v: &JsonValue, idx: usize) -> Option<Question> {
    let question = ["question", "text", "prompt"]
        .iter()
        .find_map(|k| v.get(*k).and_then(|s| s.as_str()))
        .map(str::trim)
        .filter(|s| !s.is_empty())?
        .to_string();

    let options: Option<Vec<String>> = v.get("options").and_then(|o| o.as_array()).map(|a| {
        a.iter()
            .map(|x| match x {
                JsonValue::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect()
    });

    let correct: Option<AnswerValue> = v
        .get("correctAnswer")
        .or_else(|| v.get("correct_answer"))
        .filter(|c| !c.is_null())
        .and_then(|c| serde_json::from_value(c.clone()).ok());

    let question_type = match v.get("type").and_then(|t| t.as_str()) {
        Some(t) => serde_json::from_value::<QuestionType>(JsonValue::String(t.to_string())).ok()?,
        None if options.is_some() => QuestionType::MultipleChoice,
        None if matches!(correct, Some(AnswerValue::Bool(_))) => QuestionType::TrueFalse,
        None => QuestionType::Text,
    };

    let correct_answer = match question_type {
        QuestionType::MultipleChoice => {
            let opts = options.as_ref().filter(|o| o.len() >= 2)?;
            Some(AnswerValue::Index(option_index(opts, correct.as_ref()?)?))
        }
        QuestionType::TrueFalse => Some(match correct? {
            AnswerValue::Bool(b) => AnswerValue::Bool(b),
            other => AnswerValue::Bool(other.as_bool()?),
        }),
        QuestionType::Code | QuestionType::Text => correct,
    };

    let id = v
        .get("id")
        .and_then(|i| i.as_i64())
        .filter(|i| *i > 0 && *i <= i32::MAX as i64)
        .map(|i| i as i32)
        .unwrap_or(idx as i32 + 1);

    let points = v
        .get("points")
        .and_then(|p| p.as_u64())
        .map(|p| p.min(1000) as u32)
        .unwrap_or_else(default_points);

    Some(Question {
        id,
        question_type,
        question,
        options,
        correct_answer,
        points,
        explanation: v
            .get("explanation")
            .and_then(|e| e.as_str())
            .map(str::to_string),
        language: v.get("language").and_then(|l| l.as_str()).map(str::to_string),
    })
}

/// Resolves a multiple-choice answer key to an in-range option index. Keys
/// written as option text are matched case-insensitively.
fn option_index(options: &[String], key: &AnswerValue) -> Option<i64> {
    let in_range = |i: i64| (i >= 0 && (i as usize) < options.len()).then_some(i);
    match key {
        AnswerValue::Index(i) => in_range(*i),
        AnswerValue::Text(text) => {
            let wanted = text.trim().to_lowercase();
            options
                .iter()
                .position(|o| o.trim().to_lowercase() == wanted)
                .map(|p| p as i64)
                .or_else(|| text.trim().parse::<i64>().ok().and_then(in_range))
        }
        AnswerValue::Bool(_) => None,
    }
}
