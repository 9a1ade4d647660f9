//! Contact-form handling
//!
//! Composes and dispatches the two mails a contact query produces: the
//! forwarded query to the operator inbox and the acknowledgment back to the
//! sender. Delivery goes through the [`Mailer`] trait; the default
//! implementation logs instead of speaking SMTP.

use async_trait::async_trait;
use lorry_core::{config::MailConfig, traits::Mailer, AppError, AppResult};
use std::sync::Arc;
use tracing::{info, instrument};

/// A submitted contact query
#[derive(Debug, Clone, Default)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
}

/// Contact-form service
pub struct ContactService {
    mailer: Arc<dyn Mailer>,
    config: MailConfig,
}

impl ContactService {
    /// Create a new contact service
    pub fn new(mailer: Arc<dyn Mailer>, config: MailConfig) -> Self {
        Self { mailer, config }
    }

    /// Forward a query to the operator inbox and acknowledge the sender
    #[instrument(skip(self, msg))]
    pub async fn send_query(&self, msg: &ContactMessage) -> AppResult<()> {
        let required = [&msg.name, &msg.email, &msg.subject, &msg.message];
        if required.iter().any(|v| v.trim().is_empty()) {
            return Err(AppError::Validation(
                "Please fill all required fields.".to_string(),
            ));
        }

        let query_subject = format!("Contact Query: {}", msg.subject);
        let query_body = format!(
            "Name: {}\nEmail: {}\nPhone: {}\nMessage:\n{}",
            msg.name,
            msg.email,
            msg.phone.as_deref().unwrap_or(""),
            msg.message
        );
        self.mailer
            .send(&self.config.operator_inbox, &query_subject, &query_body)
            .await?;

        let ack_subject = "Thank you for contacting Lorryline Logistics";
        let ack_body = format!(
            "Dear {},\n\nThank you for reaching out to Lorryline Logistics. \
             We have received your message and our team will get back to you soon.\n\n\
             Your Query:\n{}\n\nBest regards,\nLorryline Logistics Team",
            msg.name, msg.message
        );
        self.mailer.send(&msg.email, ack_subject, &ack_body).await?;

        info!(from = %msg.email, subject = %msg.subject, "Contact query dispatched");
        Ok(())
    }
}

/// Log-only mailer
///
/// Stands in for a real transport in development and tests; every message
/// is emitted as a structured log line.
#[derive(Debug, Clone, Default)]
pub struct TracingMailer;

#[async_trait]
impl Mailer for TracingMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        info!(to = %to, subject = %subject, bytes = body.len(), "Outbound mail");
        Ok(())
    }
}
