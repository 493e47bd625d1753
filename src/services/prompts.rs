use crate::models::aptitude_test::TestContext;
use crate::models::question::Question;
use crate::models::submission::TestResult;

const APTITUDE_TEST_TEMPLATE: &str = include_str!("../../prompts/aptitude_test.md");
const TEST_INSIGHTS_TEMPLATE: &str = include_str!("../../prompts/test_insights.md");

pub const DEFAULT_QUESTION_COUNT: u32 = 10;
pub const MAX_QUESTION_COUNT: u32 = 25;

pub fn aptitude_test_prompt(ctx: &TestContext) -> String {
    let count = ctx
        .question_count
        .unwrap_or(DEFAULT_QUESTION_COUNT)
        .clamp(1, MAX_QUESTION_COUNT);

    render(
        APTITUDE_TEST_TEMPLATE,
        &[
            ("job_title", ctx.job_title.trim()),
            ("company_name", or_unknown(ctx.company_name.as_deref())),
            ("company_industry", or_unknown(ctx.company_industry.as_deref())),
            ("job_description", or_unknown(ctx.job_description.as_deref())),
            ("requirements", or_unknown(ctx.requirements.as_deref())),
            ("question_count", &count.to_string()),
        ],
    )
}

pub fn test_insights_prompt(test_title: &str, questions: &[Question], result: &TestResult) -> String {
    let missed: Vec<String> = result
        .graded
        .iter()
        .filter(|g| !g.is_correct)
        .filter_map(|g| questions.iter().find(|q| q.id == g.question_id))
        .map(|q| format!("- {}", q.question))
        .collect();
    let missed = if missed.is_empty() {
        "(none)".to_string()
    } else {
        missed.join("\n")
    };

    render(
        TEST_INSIGHTS_TEMPLATE,
        &[
            ("test_title", test_title),
            ("score", &result.score.to_string()),
            ("earned_points", &result.earned_points.to_string()),
            ("total_points", &result.total_points.to_string()),
            ("correct_count", &result.correct_count.to_string()),
            ("total_questions", &result.total_questions.to_string()),
            ("missed_questions", &missed),
        ],
    )
}

fn or_unknown(value: Option<&str>) -> &str {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => "Not specified",
    }
}

fn render(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{{{}}}}}", key), value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolates_job_and_company_fields() {
        let ctx = TestContext {
            job_title: "Backend Developer".into(),
            company_name: Some("Tecnologías Andinas".into()),
            requirements: Some("Rust, SQL".into()),
            question_count: Some(5),
            ..Default::default()
        };
        let prompt = aptitude_test_prompt(&ctx);
        assert!(prompt.contains("Position: Backend Developer"));
        assert!(prompt.contains("Company: Tecnologías Andinas"));
        assert!(prompt.contains("Rust, SQL"));
        assert!(prompt.contains("Write exactly 5 questions"));
        assert!(prompt.contains("Industry: Not specified"));
        assert!(!prompt.contains("{{"));
    }

    #[test]
    fn question_count_is_clamped() {
        let ctx = TestContext {
            job_title: "QA".into(),
            question_count: Some(500),
            ..Default::default()
        };
        assert!(aptitude_test_prompt(&ctx).contains("Write exactly 25 questions"));
    }
}
