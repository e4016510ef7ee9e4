// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted external responder for deterministic testing.
//!
//! `MockResponder` implements `ExternalResponder` with a FIFO queue of
//! outcomes and records every request it receives.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use novyra_core::NovyraError;
use novyra_core::traits::{ExternalResponder, PluginAdapter};
use novyra_core::types::{AdapterType, HealthStatus, ResponderReply, ResponderRequest};

/// One scripted answer.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    Reply(ResponderReply),
    /// Respond with `NovyraError::Responder`.
    Fail(String),
    /// Sleep before answering, to exercise caller timeouts.
    Stall(Duration),
}

/// Outcomes are popped in order. When the queue is empty, a plain
/// "mock response" reply is returned.
#[derive(Default)]
pub struct MockResponder {
    outcomes: Arc<Mutex<VecDeque<MockOutcome>>>,
    requests: Arc<Mutex<Vec<ResponderRequest>>>,
}

impl MockResponder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A plain answer with confidence 0.85 and no escalation.
    pub fn answer(text: &str) -> ResponderReply {
        ResponderReply {
            text: text.to_string(),
            confidence: 0.85,
            should_escalate: false,
            failed: false,
            intent: "general".to_string(),
        }
    }

    pub async fn push(&self, outcome: MockOutcome) {
        self.outcomes.lock().await.push_back(outcome);
    }

    pub async fn push_reply(&self, reply: ResponderReply) {
        self.push(MockOutcome::Reply(reply)).await;
    }

    pub async fn push_failure(&self, message: &str) {
        self.push(MockOutcome::Fail(message.to_string())).await;
    }

    /// Requests seen so far, oldest first.
    pub async fn requests(&self) -> Vec<ResponderRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl PluginAdapter for MockResponder {
    fn name(&self) -> &str {
        "mock-responder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Responder
    }

    async fn health_check(&self) -> Result<HealthStatus, NovyraError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), NovyraError> {
        Ok(())
    }
}

#[async_trait]
impl ExternalResponder for MockResponder {
    async fn respond(&self, request: &ResponderRequest) -> Result<ResponderReply, NovyraError> {
        self.requests.lock().await.push(request.clone());
        let outcome = self.outcomes.lock().await.pop_front();

        match outcome {
            Some(MockOutcome::Reply(reply)) => Ok(reply),
            Some(MockOutcome::Fail(message)) => Err(NovyraError::Responder {
                message,
                source: None,
            }),
            Some(MockOutcome::Stall(delay)) => {
                tokio::time::sleep(delay).await;
                Ok(Self::answer("too late"))
            }
            None => Ok(Self::answer("mock response")),
        }
    }
}
