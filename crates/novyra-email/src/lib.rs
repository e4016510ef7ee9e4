// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound email for the Novyra chat engine.
//!
//! [`SmtpMailer`] delivers over SMTP via `lettre`; [`LogMailer`] only logs and
//! is selected when `email.enabled = false`.

pub mod log;
pub mod smtp;

use std::sync::Arc;

use novyra_config::model::EmailConfig;
use novyra_core::error::NovyraError;
use novyra_core::traits::EmailSender;

pub use log::LogMailer;
pub use smtp::SmtpMailer;

/// Picks the mailer for the given configuration.
pub fn mailer_from_config(config: &EmailConfig) -> Result<Arc<dyn EmailSender>, NovyraError> {
    if config.enabled {
        Ok(Arc::new(SmtpMailer::new(config)?))
    } else {
        Ok(Arc::new(LogMailer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use novyra_core::traits::PluginAdapter;

    #[test]
    fn disabled_email_uses_log_mailer() {
        let mailer = mailer_from_config(&EmailConfig::default()).unwrap();
        assert_eq!(mailer.name(), "log");
    }

    #[test]
    fn enabled_email_uses_smtp() {
        let config = EmailConfig {
            enabled: true,
            smtp_host: Some("smtp.example.com".into()),
            username: Some("user".into()),
            password: Some("pass".into()),
            ..Default::default()
        };
        let mailer = mailer_from_config(&config).unwrap();
        assert_eq!(mailer.name(), "smtp");
    }
}
