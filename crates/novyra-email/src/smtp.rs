// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SMTP delivery over STARTTLS.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use novyra_config::model::EmailConfig;
use novyra_core::error::NovyraError;
use novyra_core::traits::{EmailSender, PluginAdapter};
use novyra_core::types::{AdapterType, EmailMessage, HealthStatus};
use tracing::{debug, info};

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Builds the transport. No connection is made until the first send.
    pub fn new(config: &EmailConfig) -> Result<Self, NovyraError> {
        let host = config
            .smtp_host
            .as_deref()
            .filter(|h| !h.trim().is_empty())
            .ok_or_else(|| NovyraError::Config("email.smtp_host is required when email.enabled = true".into()))?;

        let from = parse_mailbox(&config.from_address)?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| NovyraError::Config(format!("invalid SMTP relay {host}: {e}")))?
            .port(config.smtp_port);
        if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        info!(host, port = config.smtp_port, "SMTP mailer configured");
        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NovyraError> {
    address
        .parse()
        .map_err(|e| NovyraError::InvalidInput(format!("invalid email address {address:?}: {e}")))
}

/// Builds a plain-text message. Fails on any unparseable address.
pub fn build_message(from: &Mailbox, email: &EmailMessage) -> Result<Message, NovyraError> {
    let mut builder = Message::builder()
        .from(from.clone())
        .subject(email.subject.clone())
        .header(ContentType::TEXT_PLAIN);
    for to in &email.to {
        builder = builder.to(parse_mailbox(to)?);
    }
    builder
        .body(email.body.clone())
        .map_err(|e| NovyraError::Delivery {
            message: format!("failed to build email: {e}"),
            source: Some(Box::new(e)),
        })
}

#[async_trait]
impl PluginAdapter for SmtpMailer {
    fn name(&self) -> &str {
        "smtp"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Email
    }

    async fn health_check(&self) -> Result<HealthStatus, NovyraError> {
        match self.transport.test_connection().await {
            Ok(true) => Ok(HealthStatus::Healthy),
            Ok(false) => Ok(HealthStatus::Degraded("SMTP server refused NOOP".into())),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), NovyraError> {
        Ok(())
    }
}

#[async_trait]
impl EmailSender for SmtpMailer {
    async fn send(&self, email: &EmailMessage) -> Result<(), NovyraError> {
        if email.to.is_empty() {
            debug!(subject = %email.subject, "email has no recipients, skipped");
            return Ok(());
        }

        let message = build_message(&self.from, email)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| NovyraError::Delivery {
                message: format!("SMTP send failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        debug!(recipients = email.to.len(), subject = %email.subject, "email sent");
        Ok(())
    }
}
