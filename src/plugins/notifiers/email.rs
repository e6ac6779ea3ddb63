use async_trait::async_trait;
use lettre::message::{header, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;
use crate::plugins::traits::NotificationTransport;
use crate::utils::error::AppError;

/// SMTP delivery of plain-text alert emails.
pub struct EmailTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl EmailTransport {
    pub fn new(config: &SmtpConfig) -> crate::Result<Self> {
        let from = sender(config)?;

        let builder = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| AppError::Notification(format!("Invalid SMTP relay {}: {}", config.host, e)))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };

        let builder = match (&config.username, &config.password) {
            (Some(username), Some(password)) => {
                builder.credentials(Credentials::new(username.clone(), password.clone()))
            }
            _ => builder,
        };

        Ok(Self {
            mailer: builder.port(config.port).build(),
            from,
        })
    }
}

fn sender(config: &SmtpConfig) -> crate::Result<Mailbox> {
    format!("{} <{}>", config.from_name, config.from_address)
        .parse()
        .map_err(|e| AppError::Config(config::ConfigError::Message(format!("Invalid from address: {}", e))))
}

/// Assemble the outgoing message. Fails on an unparseable recipient.
pub fn build_message(from: &Mailbox, recipient: &str, subject: &str, body: &str) -> Result<Message, String> {
    let to: Mailbox = recipient
        .parse()
        .map_err(|e| format!("Invalid recipient {}: {}", recipient, e))?;

    Message::builder()
        .from(from.clone())
        .to(to)
        .subject(subject)
        .header(header::ContentType::TEXT_PLAIN)
        .body(body.to_string())
        .map_err(|e| format!("Failed to build email: {}", e))
}

#[async_trait]
impl NotificationTransport for EmailTransport {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), String> {
        let message = build_message(&self.from, recipient, subject, body)?;

        match self.mailer.send(message).await {
            Ok(_) => {
                tracing::debug!(recipient = %recipient, "Alert email sent");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(recipient = %recipient, error = %e, "SMTP delivery failed");
                Err(e.to_string())
            }
        }
    }
}
