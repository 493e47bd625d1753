use crate::models::question::{AnswerValue, Question, QuestionType};
use crate::models::submission::{AnswerSheet, Feedback, FeedbackTier, GradedAnswer, TestResult};

/// Code answers longer than this many characters count as correct.
pub const CODE_MIN_CHARS: usize = 20;
/// Free-text answers longer than this many characters count as correct.
pub const TEXT_MIN_CHARS: usize = 10;

pub struct GradingService;

impl GradingService {
    pub fn grade(questions: &[Question], answers: &AnswerSheet) -> TestResult {
        let mut total_points: u32 = 0;
        let mut earned_points: u32 = 0;
        let mut correct_count = 0;
        let mut graded: Vec<GradedAnswer> = Vec::with_capacity(questions.len());

        for q in questions {
            total_points += q.points;
            let answer = answers.get(&q.id).cloned().flatten();
            let (is_correct, heuristic) = match answer.as_ref() {
                None => (false, matches!(q.question_type, QuestionType::Code | QuestionType::Text)),
                Some(given) => Self::check(q, given),
            };

            let points_awarded = if is_correct { q.points } else { 0 };
            if is_correct {
                correct_count += 1;
            }
            earned_points += points_awarded;
            graded.push(GradedAnswer {
                question_id: q.id,
                question_type: q.question_type,
                answer,
                is_correct,
                points_awarded,
                max_points: q.points,
                heuristic,
            });
        }

        let score = percentage(earned_points, total_points);
        TestResult {
            score,
            earned_points,
            total_points,
            correct_count,
            total_questions: questions.len(),
            feedback: feedback_for(score),
            graded,
            submission_id: None,
        }
    }

    /// Returns `(is_correct, decided_by_heuristic)`.
    fn check(q: &Question, given: &AnswerValue) -> (bool, bool) {
        match q.question_type {
            QuestionType::MultipleChoice => {
                let expected = q.correct_answer.as_ref().and_then(AnswerValue::as_index);
                (expected.is_some() && given.as_index() == expected, false)
            }
            QuestionType::TrueFalse => {
                let expected = q.correct_answer.as_ref().and_then(AnswerValue::as_bool);
                (expected.is_some() && given.as_bool() == expected, false)
            }
            QuestionType::Code => (longer_than(given, CODE_MIN_CHARS), true),
            QuestionType::Text => (longer_than(given, TEXT_MIN_CHARS), true),
        }
    }
}

fn longer_than(given: &AnswerValue, min_chars: usize) -> bool {
    given
        .as_text()
        .map(|s| s.trim().chars().count() > min_chars)
        .unwrap_or(false)
}

pub fn percentage(earned: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    ((earned as f64 / total as f64) * 100.0).round() as u32
}

pub fn feedback_for(score: u32) -> Feedback {
    let tier = FeedbackTier::from_score(score);
    let (title, message, recommendations): (&str, &str, &[&str]) = match tier {
        FeedbackTier::Excellent => (
            "¡Excelente!",
            "Demostraste un dominio sobresaliente de los conocimientos requeridos para el puesto.",
            &[
                "Destaca estos resultados en tu CV y en la entrevista.",
                "Postula a posiciones con mayor responsabilidad técnica.",
            ],
        ),
        FeedbackTier::Good => (
            "¡Buen trabajo!",
            "Tienes una base sólida; con algo de práctica puedes alcanzar un nivel sobresaliente.",
            &[
                "Repasa los temas de las preguntas que fallaste.",
                "Realiza proyectos prácticos que refuercen esas áreas.",
            ],
        ),
        FeedbackTier::Average => (
            "Resultado aceptable",
            "Cumples con lo básico, pero hay áreas importantes que debes fortalecer.",
            &[
                "Dedica tiempo a estudiar los fundamentos del área.",
                "Toma cursos en línea enfocados en los requisitos del puesto.",
                "Vuelve a intentar la prueba después de practicar.",
            ],
        ),
        FeedbackTier::NeedsImprovement => (
            "Necesitas mejorar",
            "Tu resultado indica que aún no cumples con los conocimientos que pide el puesto.",
            &[
                "Revisa los conceptos básicos relacionados con la oferta.",
                "Busca mentoría o tutorías en la facultad.",
                "Considera postular a pasantías para ganar experiencia.",
            ],
        ),
    };

    Feedback {
        tier,
        title: title.to_string(),
        message: message.to_string(),
        recommendations: recommendations.iter().map(|r| r.to_string()).collect(),
    }
}
