// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! External conversational responder (hosted chat-completion API).

use async_trait::async_trait;

use crate::error::NovyraError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ResponderReply, ResponderRequest};

/// Produces a reply to a customer message using an external service.
///
/// Any `Err` means "unavailable": the orchestrator falls back to the
/// rule-based matcher and never shows error text to the customer.
#[async_trait]
pub trait ExternalResponder: PluginAdapter {
    async fn respond(&self, request: &ResponderRequest) -> Result<ResponderReply, NovyraError>;
}
