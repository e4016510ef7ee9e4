// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;
use novyra_core::error::NovyraError;
use novyra_core::traits::{EmailSender, PluginAdapter};
use novyra_core::types::{AdapterType, EmailMessage, HealthStatus};
use tracing::info;

/// Mailer used when SMTP delivery is off. Every message is logged at `info`
/// and dropped.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl PluginAdapter for LogMailer {
    fn name(&self) -> &str {
        "log"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Email
    }

    async fn health_check(&self) -> Result<HealthStatus, NovyraError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), NovyraError> {
        Ok(())
    }
}

#[async_trait]
impl EmailSender for LogMailer {
    async fn send(&self, email: &EmailMessage) -> Result<(), NovyraError> {
        info!(
            to = %email.to.join(", "),
            subject = %email.subject,
            "email delivery disabled, message logged only"
        );
        Ok(())
    }
}
