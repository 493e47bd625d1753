use crate::error::Result;
use crate::models::aptitude_test::{AptitudeTest, TestContext};
use crate::models::question::Question;
use crate::models::submission::TestResult;
use crate::services::{prompts, quiz_parser};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::time::Duration;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationOutput {
    pub test: AptitudeTest,
    pub used_fallback: bool,
    pub fallback_reason: Option<String>,
    pub logs: Vec<String>,
}

#[derive(Clone)]
pub struct AIService {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl AIService {
    pub fn new(api_key: String, base_url: String, model: String, client: Client) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        }
    }

    /// Builds a quiz for the given job. Network and parse failures degrade
    /// to the default quiz; the output says so.
    pub async fn generate_test(&self, ctx: &TestContext, default_minutes: u32) -> GenerationOutput {
        let mut logs: Vec<String> = vec![];
        let prompt = prompts::aptitude_test_prompt(ctx);
        let default_title = format!("Prueba de aptitud: {}", ctx.job_title.trim());
        logs.push(format!("Prompt built for \"{}\" ({} chars).", ctx.job_title, prompt.len()));

        logs.push(format!("Sending request to {}...", self.model));
        let parsed = match self.generate_content(&prompt).await {
            Ok(reply) => {
                logs.push(format!("Response received ({} chars). Parsing...", reply.len()));
                quiz_parser::parse_quiz(&reply, &default_title, default_minutes)
            }
            Err(e) => {
                tracing::error!(error = %e, job_title = %ctx.job_title, "aptitude test generation failed");
                quiz_parser::ParsedQuiz::fallback(format!("generation request failed: {}", e))
            }
        };

        if let Some(reason) = &parsed.fallback_reason {
            tracing::warn!(%reason, job_title = %ctx.job_title, "serving default quiz");
            logs.push(format!("Using default quiz: {}", reason));
        } else {
            logs.push(format!("Finalized {} questions.", parsed.test.questions.len()));
        }

        GenerationOutput {
            used_fallback: parsed.used_fallback(),
            fallback_reason: parsed.fallback_reason,
            test: parsed.test,
            logs,
        }
    }

    /// Narrative advice for a finished test, or `None` when the model is
    /// unavailable.
    pub async fn test_insights(
        &self,
        test_title: &str,
        questions: &[Question],
        result: &TestResult,
    ) -> Option<String> {
        let prompt = prompts::test_insights_prompt(test_title, questions, result);
        match self.generate_content(&prompt).await {
            Ok(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, "insight generation failed");
                None
            }
        }
    }

    pub async fn generate_content(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let payload = serde_json::json!({
            "contents": [
                { "parts": [ { "text": prompt } ] }
            ],
            "generationConfig": { "temperature": 0.7 }
        });

        let res = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .timeout(Duration::from_secs(120))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Gemini API error {}: {}", status, text).into());
        }

        let body: JsonValue = res.json().await?;
        reply_text(&body)
            .ok_or_else(|| anyhow::anyhow!("Invalid Gemini response format").into())
    }
}

/// Concatenated text parts of the first candidate.
fn reply_text(body: &JsonValue) -> Option<String> {
    let parts = body
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect();
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_first_candidate_text() {
        let body = serde_json::json!({
            "candidates": [
                {"content": {"parts": [{"text": "```json\n"}, {"text": "{}\n```"}]}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        });
        assert_eq!(reply_text(&body).as_deref(), Some("```json\n{}\n```"));
    }

    #[test]
    fn missing_candidates_is_none() {
        assert_eq!(reply_text(&serde_json::json!({"promptFeedback": {}})), None);
        assert_eq!(
            reply_text(&serde_json::json!({"candidates": [{"content": {"parts": []}}]})),
            None
        );
    }
}
