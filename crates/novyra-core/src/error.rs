// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Novyra chat engine.

use thiserror::Error;

/// The primary error type used across all Novyra adapter traits and core operations.
#[derive(Debug, Error)]
pub enum NovyraError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// External responder errors (transport failure, bad status, malformed reply).
    ///
    /// Callers treat this as "responder unavailable", never as an answer.
    #[error("responder error: {message}")]
    Responder {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Live-update fan-out failed.
    #[error("broadcast error: {message}")]
    Broadcast { message: String },

    /// Notification or email delivery failed.
    #[error("delivery error: {message}")]
    Delivery {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A lookup that must succeed found nothing.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The caller supplied input the engine refuses to process.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An agent had no spare chat capacity when a slot was requested.
    #[error("agent {agent_id} is at capacity")]
    Capacity { agent_id: i64 },

    /// Adapter health check failed.
    #[error("health check failed for {name}: {source}")]
    HealthCheckFailed {
        name: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl NovyraError {
    /// Shorthand for a [`NovyraError::NotFound`] on a chat session.
    pub fn session_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "session",
            id: id.into(),
        }
    }
}
