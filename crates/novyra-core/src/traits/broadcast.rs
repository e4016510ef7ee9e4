// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;

use crate::error::NovyraError;
use crate::types::ChatEvent;

/// Fans session events out to live subscribers (customer widget, agent console).
///
/// Publishing to a topic nobody listens on succeeds.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    async fn publish(&self, session_id: &str, event: ChatEvent) -> Result<(), NovyraError>;
}
