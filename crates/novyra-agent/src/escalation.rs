// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hand-off of sessions to human agents.
//!
//! Agent load is only changed through the store's conditional reserve and
//! release operations, so concurrent assignments can never push an agent
//! past `max_concurrent_chats`.

use std::sync::Arc;

use novyra_core::error::NovyraError;
use novyra_core::traits::ChatStore;
use novyra_core::types::{AgentProfile, ChatSession, NewMessage, SessionPatch, SessionStatus};
use tracing::{debug, info, warn};

/// System message appended when every agent is busy.
pub const QUEUED_NOTICE: &str = "All our agents are currently busy. Your chat will be assigned to an agent shortly. Thank you for your patience.";

/// Result of [`EscalationManager::assign_agent`].
#[derive(Debug, Clone, PartialEq)]
pub enum AssignOutcome {
    /// The session already had an agent; nothing changed.
    AlreadyAssigned { agent_id: i64 },
    /// A slot was reserved and the agent attached in this call.
    Assigned(AgentProfile),
    /// Nobody had capacity. The session now waits for an agent.
    Queued,
}

pub struct EscalationManager {
    store: Arc<dyn ChatStore>,
    default_max_chats: u32,
}

impl EscalationManager {
    pub fn new(store: Arc<dyn ChatStore>, default_max_chats: u32) -> Self {
        Self {
            store,
            default_max_chats,
        }
    }

    /// Creates a profile for every active staff user that lacks one.
    pub async fn ensure_agent_profiles(&self) -> Result<Vec<AgentProfile>, NovyraError> {
        let staff = self.store.list_active_staff().await?;
        let mut profiles = Vec::with_capacity(staff.len());
        for user in staff {
            profiles.push(
                self.store
                    .ensure_agent_profile(user.id, self.default_max_chats)
                    .await?,
            );
        }
        debug!(count = profiles.len(), "agent profiles ensured");
        Ok(profiles)
    }

    /// Whether any agent could take a chat right now.
    pub async fn agents_available(&self) -> Result<bool, NovyraError> {
        self.ensure_agent_profiles().await?;
        Ok(!self.store.agent_candidates().await?.is_empty())
    }

    /// Attaches the least-loaded agent with a free slot to `session`.
    pub async fn assign_agent(&self, session: &ChatSession) -> Result<AssignOutcome, NovyraError> {
        if let Some(agent_id) = session.assigned_agent_id {
            return Ok(AssignOutcome::AlreadyAssigned { agent_id });
        }

        self.ensure_agent_profiles().await?;

        for candidate in self.store.agent_candidates().await? {
            if !self.store.try_reserve_agent(candidate.id).await? {
                debug!(agent_id = candidate.id, "agent filled up, trying next");
                continue;
            }

            if self.store.attach_agent(&session.id, candidate.id).await? {
                let agent = self
                    .store
                    .get_agent(candidate.id)
                    .await?
                    .unwrap_or(candidate);
                info!(
                    session_id = %session.id,
                    agent_id = agent.id,
                    current_chats = agent.current_chats,
                    "agent assigned"
                );
                return Ok(AssignOutcome::Assigned(agent));
            }

            // Someone else attached an agent first: hand the slot back.
            self.store.release_agent_load(candidate.id, false).await?;
            if let Some(current) = self.store.get_session(&session.id).await?
                && let Some(agent_id) = current.assigned_agent_id
            {
                debug!(session_id = %session.id, agent_id, "lost attach race");
                return Ok(AssignOutcome::AlreadyAssigned { agent_id });
            }
        }

        if let Some(reference) = self.store.any_available_agent().await? {
            warn!(
                session_id = %session.id,
                agent_id = reference.id,
                current_chats = reference.current_chats,
                max = reference.max_concurrent_chats,
                "only agents at capacity, not overloading"
            );
        } else {
            warn!(session_id = %session.id, "no available agents");
        }

        self.store
            .update_session(
                &session.id,
                &SessionPatch {
                    status: Some(SessionStatus::WaitingAgent),
                    ..Default::default()
                },
            )
            .await?;
        self.store
            .append_message(&NewMessage::system(&session.id, QUEUED_NOTICE))
            .await?;

        Ok(AssignOutcome::Queued)
    }

    /// Frees the session's agent slot and counts the chat as handled.
    pub async fn release_agent(&self, session: &ChatSession) -> Result<(), NovyraError> {
        let Some(agent_id) = session.assigned_agent_id else {
            return Ok(());
        };
        self.store.release_agent_load(agent_id, true).await?;
        debug!(session_id = %session.id, agent_id, "agent released");
        Ok(())
    }
}
