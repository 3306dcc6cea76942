use crate::config::ContactConfig;
use crate::error::BiolinkError;
use crate::render::escape_html;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use std::sync::LazyLock;
use tracing::{info, warn};

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactMessage {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

impl ContactMessage {
    pub fn validate(&self) -> Result<(), BiolinkError> {
        if [&self.name, &self.email, &self.message]
            .iter()
            .any(|f| f.trim().is_empty())
        {
            return Err(BiolinkError::Validation(
                "All fields are required".to_string(),
            ));
        }
        if !EMAIL_RE.is_match(self.email.trim()) {
            return Err(BiolinkError::Validation(
                "Please enter a valid email address".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// No mail API configured, or it failed; the message went to the log.
    Logged,
}

/// Forwards contact form submissions through the Resend HTTP API when a key
/// is configured.
#[derive(Clone)]
pub struct Mailer {
    client: reqwest::Client,
    cfg: ContactConfig,
}

impl Mailer {
    pub fn new(client: reqwest::Client, cfg: ContactConfig) -> Self {
        Self { client, cfg }
    }

    pub async fn deliver(&self, msg: &ContactMessage) -> Delivery {
        if let Some(key) = self.cfg.resend_api_key.as_deref() {
            match self.send_via_resend(key, msg).await {
                Ok(()) => {
                    info!("contact message forwarded");
                    return Delivery::Sent;
                }
                Err(e) => warn!(error = %e, "mail API failed; logging contact message instead"),
            }
        }

        info!(
            from = %msg.name.trim(),
            email = %msg.email.trim(),
            message = %msg.message.trim(),
            "contact form submission"
        );
        Delivery::Logged
    }

    async fn send_via_resend(&self, key: &str, msg: &ContactMessage) -> Result<(), BiolinkError> {
        let body = json!({
            "from": self.cfg.from,
            "to": [self.cfg.to],
            "reply_to": msg.email.trim(),
            "subject": format!("New Contact Form Message from {}", msg.name.trim()),
            "html": contact_html(msg),
        });
        let resp = self
            .client
            .post(RESEND_ENDPOINT)
            .bearer_auth(key)
            .json(&body)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(BiolinkError::UpstreamStatus(resp.status()));
        }
        Ok(())
    }
}

fn contact_html(msg: &ContactMessage) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2>New Contact Form Message</h2>
  <p><strong>From:</strong> {name}</p>
  <p><strong>Email:</strong> {email}</p>
  <h3>Message:</h3>
  <div style="white-space: pre-wrap;">{message}</div>
</div>"#,
        name = escape_html(msg.name.trim()),
        email = escape_html(msg.email.trim()),
        message = escape_html(msg.message.trim()),
    )
}
