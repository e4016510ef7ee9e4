// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session lifecycle outside of customer turns: closing, resolving, rating,
//! agent replies, transcripts and learning feedback.

use std::sync::Arc;

use novyra_core::error::NovyraError;
use novyra_core::types::{ChatEvent, ChatMessage, ChatSession, NewMessage, SessionStatus};
use tracing::{debug, info, warn};

use crate::escalation::EscalationManager;
use crate::locks::SessionLocks;
use crate::EngineDeps;

pub struct SessionService {
    deps: EngineDeps,
    escalation: EscalationManager,
    locks: Arc<SessionLocks>,
    default_max_chats: u32,
}

impl SessionService {
    pub fn new(deps: EngineDeps, locks: Arc<SessionLocks>, default_max_chats: u32) -> Self {
        Self {
            escalation: EscalationManager::new(deps.store.clone(), default_max_chats),
            deps,
            locks,
            default_max_chats,
        }
    }

    async fn require_session(&self, id: &str) -> Result<ChatSession, NovyraError> {
        self.deps
            .store
            .get_session(id)
            .await?
            .ok_or_else(|| NovyraError::session_not_found(id))
    }

    /// Marks the session closed and frees its agent slot. Closing twice
    /// leaves agent load untouched.
    pub async fn close_session(&self, id: &str) -> Result<(), NovyraError> {
        self.finish(id, SessionStatus::Closed).await
    }

    pub async fn resolve_session(&self, id: &str) -> Result<(), NovyraError> {
        self.finish(id, SessionStatus::Resolved).await
    }

    async fn finish(&self, id: &str, status: SessionStatus) -> Result<(), NovyraError> {
        let _turn = self.locks.lock(id).await;
        let session = self.require_session(id).await?;

        if !self.deps.store.finish_session(id, status).await? {
            debug!(session_id = id, current = %session.status, "session already finished");
            return Ok(());
        }
        self.escalation.release_agent(&session).await?;
        info!(session_id = id, %status, "session finished");

        if let Err(e) = self
            .deps
            .broadcaster
            .publish(id, ChatEvent::StatusChanged { status })
            .await
        {
            warn!(session_id = id, error = %e, "broadcast failed");
        }
        Ok(())
    }

    /// Stores a 1 to 5 star rating with optional free-text feedback.
    pub async fn rate_session(
        &self,
        id: &str,
        rating: u8,
        feedback: Option<&str>,
    ) -> Result<(), NovyraError> {
        if !(1..=5).contains(&rating) {
            return Err(NovyraError::InvalidInput(format!(
                "rating must be between 1 and 5, got {rating}"
            )));
        }
        if !self.deps.store.rate_session(id, rating, feedback).await? {
            return Err(NovyraError::session_not_found(id));
        }
        debug!(session_id = id, rating, "session rated");
        Ok(())
    }

    /// Posts a message from a staff member. An unattended session is taken
    /// over by that staff member's agent profile.
    pub async fn agent_reply(
        &self,
        id: &str,
        staff_user_id: i64,
        content: &str,
    ) -> Result<ChatMessage, NovyraError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(NovyraError::InvalidInput("message content is required".into()));
        }

        let _turn = self.locks.lock(id).await;
        let store = &self.deps.store;
        let session = self.require_session(id).await?;
        let staff = store
            .get_staff_user(staff_user_id)
            .await?
            .ok_or_else(|| NovyraError::NotFound {
                entity: "staff user",
                id: staff_user_id.to_string(),
            })?;

        if session.assigned_agent_id.is_none() {
            let profile = store
                .ensure_agent_profile(staff_user_id, self.default_max_chats)
                .await?;
            if !store.try_reserve_agent(profile.id).await? {
                return Err(NovyraError::Capacity {
                    agent_id: profile.id,
                });
            }
            if store.attach_agent(id, profile.id).await? {
                info!(session_id = id, agent_id = profile.id, "agent took over session");
            } else {
                store.release_agent_load(profile.id, false).await?;
            }
        }

        let message = store
            .append_message(&NewMessage::agent(id, staff_user_id, content))
            .await?;

        if let Err(e) = self
            .deps
            .broadcaster
            .publish(
                id,
                ChatEvent::ChatMessage {
                    message_id: message.id,
                    message: message.content.clone(),
                    message_type: message.message_type,
                    sender_name: Some(staff.display_name().to_string()),
                },
            )
            .await
        {
            warn!(session_id = id, error = %e, "broadcast failed");
        }

        Ok(message)
    }

    /// Full transcript, oldest first.
    pub async fn session_messages(&self, id: &str) -> Result<Vec<ChatMessage>, NovyraError> {
        self.require_session(id).await?;
        self.deps.store.list_messages(id).await
    }

    /// Feedback on a logged exchange. Helpful exchanges feed later matching.
    pub async fn mark_helpful(&self, learning_id: i64, helpful: bool) -> Result<(), NovyraError> {
        if self
            .deps
            .store
            .set_learning_feedback(learning_id, helpful)
            .await?
        {
            Ok(())
        } else {
            Err(NovyraError::NotFound {
                entity: "learning record",
                id: learning_id.to_string(),
            })
        }
    }

    /// Inserts the built-in FAQ entries into an empty knowledge base.
    /// Returns how many were added.
    pub async fn seed_default_knowledge(&self) -> Result<usize, NovyraError> {
        let store = &self.deps.store;
        if store.count_knowledge().await? > 0 {
            debug!("knowledge base not empty, skipping seed");
            return Ok(0);
        }

        let mut added = 0;
        for entry in novyra_router::catalog::default_faqs() {
            if store.insert_knowledge_if_absent(&entry).await? {
                added += 1;
            }
        }
        info!(added, "default knowledge seeded");
        Ok(added)
    }

    /// Takes a staff member's agent profile in or out of rotation.
    pub async fn set_agent_availability(
        &self,
        staff_user_id: i64,
        available: bool,
    ) -> Result<(), NovyraError> {
        let profile = self
            .deps
            .store
            .ensure_agent_profile(staff_user_id, self.default_max_chats)
            .await?;
        self.deps
            .store
            .set_agent_availability(profile.id, available)
            .await?;
        info!(staff_user_id, agent_id = profile.id, available, "agent availability changed");
        Ok(())
    }
}
