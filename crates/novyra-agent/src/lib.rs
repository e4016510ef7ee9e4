// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation routing and escalation for the Novyra chat engine.
//!
//! The [`ChatEngine`] is the central coordinator that:
//! - Decides per message whether the external responder, the rule-based
//!   matcher or a human agent answers
//! - Assigns agents without exceeding their chat capacity
//! - Tracks session lifecycle, tickets and learning feedback
//! - Notifies staff and publishes live events for every session

pub mod escalation;
pub mod hours;
pub mod locks;
pub mod notices;
pub mod orchestrator;
pub mod session;
pub mod tickets;
pub mod turn;

use std::sync::Arc;

use novyra_config::NovyraConfig;
use novyra_core::error::NovyraError;
use novyra_core::traits::{
    Broadcaster, ChatStore, Clock, EmailSender, ExternalResponder, NotificationSink, SystemClock,
};
use novyra_core::types::{AgentProfile, ChatMessage, ClientMeta};
use tracing::info;

use crate::escalation::EscalationManager;
use crate::locks::SessionLocks;
use crate::session::SessionService;
use crate::turn::TurnController;

pub use escalation::AssignOutcome;
pub use orchestrator::{OrchestratedReply, Orchestrator, ReplySource};
pub use turn::{QuickAction, TurnResult};

/// Backends the engine talks to.
#[derive(Clone)]
pub struct EngineDeps {
    pub store: Arc<dyn ChatStore>,
    pub notifier: Arc<dyn NotificationSink>,
    pub mailer: Arc<dyn EmailSender>,
    pub broadcaster: Arc<dyn Broadcaster>,
    pub clock: Arc<dyn Clock>,
    /// Tried before the rule-based matcher when set.
    pub responder: Option<Arc<dyn ExternalResponder>>,
}

impl EngineDeps {
    /// Wall-clock time and no external responder.
    pub fn new(
        store: Arc<dyn ChatStore>,
        notifier: Arc<dyn NotificationSink>,
        mailer: Arc<dyn EmailSender>,
        broadcaster: Arc<dyn Broadcaster>,
    ) -> Self {
        Self {
            store,
            notifier,
            mailer,
            broadcaster,
            clock: Arc::new(SystemClock),
            responder: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_responder(mut self, responder: Arc<dyn ExternalResponder>) -> Self {
        self.responder = Some(responder);
        self
    }
}

/// Entry point for everything that happens in a chat.
pub struct ChatEngine {
    turns: TurnController,
    sessions: SessionService,
    escalation: EscalationManager,
    locks: Arc<SessionLocks>,
}

impl ChatEngine {
    pub fn new(config: &NovyraConfig, deps: EngineDeps) -> Result<Self, NovyraError> {
        let locks = Arc::new(SessionLocks::new());
        let default_max = config.escalation.default_max_concurrent_chats;

        let engine = Self {
            escalation: EscalationManager::new(deps.store.clone(), default_max),
            sessions: SessionService::new(deps.clone(), locks.clone(), default_max),
            turns: TurnController::new(config, deps.clone(), locks.clone())?,
            locks,
        };

        info!(
            assistant = config.assistant.name.as_str(),
            external_responder = deps.responder.is_some(),
            hours = %engine.turns.schedule().summary(),
            "chat engine initialized"
        );
        Ok(engine)
    }

    /// Handles one customer message. A missing session id starts a new session.
    pub async fn process_turn(
        &self,
        session_id: Option<&str>,
        message: &str,
        meta: &ClientMeta,
    ) -> Result<TurnResult, NovyraError> {
        self.turns.process_turn(session_id, message, meta).await
    }

    /// Sessions with a turn in flight or queued.
    pub fn sessions_in_flight(&self) -> usize {
        self.locks.len()
    }

    pub async fn close_session(&self, id: &str) -> Result<(), NovyraError> {
        self.sessions.close_session(id).await
    }

    pub async fn resolve_session(&self, id: &str) -> Result<(), NovyraError> {
        self.sessions.resolve_session(id).await
    }

    pub async fn rate_session(
        &self,
        id: &str,
        rating: u8,
        feedback: Option<&str>,
    ) -> Result<(), NovyraError> {
        self.sessions.rate_session(id, rating, feedback).await
    }

    pub async fn agent_reply(
        &self,
        id: &str,
        staff_user_id: i64,
        content: &str,
    ) -> Result<ChatMessage, NovyraError> {
        self.sessions.agent_reply(id, staff_user_id, content).await
    }

    pub async fn session_messages(&self, id: &str) -> Result<Vec<ChatMessage>, NovyraError> {
        self.sessions.session_messages(id).await
    }

    pub async fn mark_helpful(&self, learning_id: i64, helpful: bool) -> Result<(), NovyraError> {
        self.sessions.mark_helpful(learning_id, helpful).await
    }

    pub async fn seed_default_knowledge(&self) -> Result<usize, NovyraError> {
        self.sessions.seed_default_knowledge().await
    }

    pub async fn set_agent_availability(
        &self,
        staff_user_id: i64,
        available: bool,
    ) -> Result<(), NovyraError> {
        self.sessions
            .set_agent_availability(staff_user_id, available)
            .await
    }

    /// Agent profiles of all active staff, created on first use.
    pub async fn agent_profiles(&self) -> Result<Vec<AgentProfile>, NovyraError> {
        self.escalation.ensure_agent_profiles().await
    }

    /// e.g. "Monday to Saturday, 9:00 AM to 6:00 PM (WAT)".
    pub fn business_hours_summary(&self) -> String {
        self.turns.schedule().summary()
    }
}
