use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmailDelivery {
    pub delivered: bool,
    /// The message was only logged, no provider accepted it.
    pub simulated: bool,
    pub detail: Option<String>,
}

impl EmailDelivery {
    fn sent() -> Self {
        Self {
            delivered: true,
            simulated: false,
            detail: None,
        }
    }

    fn simulated(detail: impl Into<String>) -> Self {
        Self {
            delivered: true,
            simulated: true,
            detail: Some(detail.into()),
        }
    }
}

#[derive(Clone)]
pub struct EmailService {
    client: Client,
    api_url: Option<String>,
    api_key: Option<String>,
    from: String,
}

impl EmailService {
    pub fn new(
        api_url: Option<String>,
        api_key: Option<String>,
        from: String,
        client: Client,
    ) -> Self {
        Self {
            client,
            api_url,
            api_key,
            from,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_url.is_some() && self.api_key.is_some()
    }

    /// Sends through the configured provider. Without one, or when the
    /// provider refuses, the message is logged and reported as simulated.
    pub async fn send(&self, message: &EmailMessage) -> EmailDelivery {
        let (Some(url), Some(key)) = (self.api_url.as_deref(), self.api_key.as_deref()) else {
            tracing::info!(to = %message.to, subject = %message.subject, "email provider not configured, simulating send");
            return EmailDelivery::simulated("email provider not configured");
        };

        let body = serde_json::json!({
            "from": self.from,
            "to": [message.to],
            "subject": message.subject,
            "html": message.html,
        });
        let res = self
            .client
            .post(url)
            .bearer_auth(key)
            .json(&body)
            .timeout(Duration::from_secs(15))
            .send()
            .await;

        match res {
            Ok(resp) if resp.status().is_success() => {
                tracing::info!(to = %message.to, "email delivered");
                EmailDelivery::sent()
            }
            Ok(resp) => {
                let status = resp.status();
                let text = resp.text().await.unwrap_or_default();
                tracing::warn!(%status, body = %text, to = %message.to, "email provider rejected message, simulating send");
                EmailDelivery::simulated(format!("provider returned {}", status))
            }
            Err(e) => {
                tracing::warn!(error = %e, to = %message.to, "email delivery failed, simulating send");
                EmailDelivery::simulated(format!("delivery failed: {}", e))
            }
        }
    }
}

pub fn cv_share_message(to: &str, student_name: &str, cv_url: &str, note: Option<&str>) -> EmailMessage {
    let note = note
        .filter(|n| !n.trim().is_empty())
        .map(|n| format!("<p>{}</p>", html_escape(n.trim())))
        .unwrap_or_default();
    EmailMessage {
        to: to.to_string(),
        subject: format!("CV de {}", student_name),
        html: format!(
            "<p>{} compartió su CV contigo a través de FICCT Talent.</p>{}<p><a href=\"{}\">Ver CV</a></p>",
            html_escape(student_name),
            note,
            html_escape(cv_url)
        ),
    }
}

fn html_escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_provider_simulates() {
        let svc = EmailService::new(None, None, "noreply@ficct.test".into(), Client::new());
        assert!(!svc.is_configured());
        let delivery = svc
            .send(&cv_share_message("rrhh@empresa.test", "Ana", "https://cv.test/ana.pdf", None))
            .await;
        assert!(delivery.simulated);
        assert!(delivery.delivered);
    }

    #[test]
    fn share_message_escapes_user_text() {
        let msg = cv_share_message(
            "a@b.test",
            "Ana <script>",
            "https://cv.test/a.pdf?x=1&y=2",
            Some("  Saludos  "),
        );
        assert!(msg.html.contains("Ana &lt;script&gt;"));
        assert!(msg.html.contains("x=1&amp;y=2"));
        assert!(msg.html.contains("<p>Saludos</p>"));
        assert_eq!(msg.subject, "CV de Ana <script>");
    }
}
