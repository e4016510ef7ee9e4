// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;

use crate::error::NovyraError;
use crate::types::NewNotification;

/// Destination for staff-facing notifications.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, notification: &NewNotification) -> Result<(), NovyraError>;
}
