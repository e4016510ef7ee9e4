// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound email delivery.

use async_trait::async_trait;

use crate::error::NovyraError;
use crate::traits::adapter::PluginAdapter;
use crate::types::EmailMessage;

#[async_trait]
pub trait EmailSender: PluginAdapter {
    /// Delivers one message to every recipient in `email.to`.
    async fn send(&self, email: &EmailMessage) -> Result<(), NovyraError>;
}
