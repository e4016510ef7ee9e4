// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence trait for sessions, transcripts, agents and reference data.

use async_trait::async_trait;

use crate::error::NovyraError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    AgentProfile, ChatMessage, ChatSession, ClientMeta, KnowledgeEntry, LearningRecord,
    NewKnowledgeEntry, NewLearningRecord, NewMessage, NewStaffUser, NewTicket, Notification,
    SessionPatch, SessionStatus, StaffUser, Ticket, WebsitePage,
};

/// Storage backend for the chat engine.
///
/// Lookups that may legitimately miss return `Ok(None)`. Agent load is only
/// ever changed through [`try_reserve_agent`](ChatStore::try_reserve_agent)
/// and [`release_agent_load`](ChatStore::release_agent_load), which apply
/// atomically and never move `current_chats` outside its bounds.
#[async_trait]
pub trait ChatStore: PluginAdapter {
    // --- sessions ---

    async fn get_session(&self, id: &str) -> Result<Option<ChatSession>, NovyraError>;

    /// Returns the session, creating it when missing. Customer fields present
    /// in `meta` overwrite stored values. The flag is `true` on creation.
    async fn get_or_create_session(
        &self,
        id: &str,
        meta: &ClientMeta,
    ) -> Result<(ChatSession, bool), NovyraError>;

    async fn update_session(&self, id: &str, patch: &SessionPatch) -> Result<(), NovyraError>;

    /// Moves a non-terminal session into `status` and stamps `resolved_at`.
    /// Returns `false` when the session was already resolved or closed.
    async fn finish_session(&self, id: &str, status: SessionStatus) -> Result<bool, NovyraError>;

    async fn rate_session(
        &self,
        id: &str,
        rating: u8,
        feedback: Option<&str>,
    ) -> Result<bool, NovyraError>;

    /// Attaches an agent to a session that has none, setting status
    /// `agent_assigned`. Returns `false` when another agent got there first.
    async fn attach_agent(&self, session_id: &str, agent_id: i64) -> Result<bool, NovyraError>;

    // --- messages ---

    async fn append_message(&self, msg: &NewMessage) -> Result<ChatMessage, NovyraError>;

    /// The newest `limit` messages, oldest first.
    async fn recent_messages(
        &self,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, NovyraError>;

    async fn list_messages(&self, session_id: &str) -> Result<Vec<ChatMessage>, NovyraError>;

    async fn latest_user_message(
        &self,
        session_id: &str,
    ) -> Result<Option<ChatMessage>, NovyraError>;

    // --- staff and agents ---

    async fn create_staff_user(&self, user: &NewStaffUser) -> Result<StaffUser, NovyraError>;

    async fn get_staff_user(&self, id: i64) -> Result<Option<StaffUser>, NovyraError>;

    async fn list_active_staff(&self) -> Result<Vec<StaffUser>, NovyraError>;

    /// Returns the agent profile for a staff user, creating an available one
    /// with `default_max` slots when missing.
    async fn ensure_agent_profile(
        &self,
        staff_user_id: i64,
        default_max: u32,
    ) -> Result<AgentProfile, NovyraError>;

    async fn get_agent(&self, id: i64) -> Result<Option<AgentProfile>, NovyraError>;

    /// Available agents of active staff with spare capacity, least loaded first.
    async fn agent_candidates(&self) -> Result<Vec<AgentProfile>, NovyraError>;

    /// Any available agent of active staff, regardless of load.
    async fn any_available_agent(&self) -> Result<Option<AgentProfile>, NovyraError>;

    async fn set_agent_availability(
        &self,
        agent_id: i64,
        available: bool,
    ) -> Result<(), NovyraError>;

    /// Takes one chat slot if the agent has one free. Returns whether it did.
    async fn try_reserve_agent(&self, agent_id: i64) -> Result<bool, NovyraError>;

    /// Gives back one chat slot (floored at zero). `handled` also bumps the
    /// lifetime counter.
    async fn release_agent_load(&self, agent_id: i64, handled: bool) -> Result<(), NovyraError>;

    // --- knowledge and learning ---

    /// Active entries, highest priority first.
    async fn active_knowledge(&self) -> Result<Vec<KnowledgeEntry>, NovyraError>;

    async fn insert_knowledge(&self, entry: &NewKnowledgeEntry) -> Result<i64, NovyraError>;

    /// Inserts the entry unless one with the same title exists. Returns
    /// whether a row was added.
    async fn insert_knowledge_if_absent(
        &self,
        entry: &NewKnowledgeEntry,
    ) -> Result<bool, NovyraError>;

    async fn count_knowledge(&self) -> Result<u64, NovyraError>;

    async fn record_learning(&self, record: &NewLearningRecord) -> Result<i64, NovyraError>;

    /// Helpful, non-escalated records ordered by confidence then recency.
    async fn helpful_learning(&self, limit: usize) -> Result<Vec<LearningRecord>, NovyraError>;

    /// Distinct intents of records marked helpful.
    async fn helpful_intents(&self) -> Result<Vec<String>, NovyraError>;

    async fn set_learning_feedback(&self, id: i64, helpful: bool) -> Result<bool, NovyraError>;

    // --- tickets ---

    async fn create_ticket(&self, ticket: &NewTicket) -> Result<Ticket, NovyraError>;

    async fn mark_ticket_notified(&self, id: i64) -> Result<(), NovyraError>;

    async fn tickets_for_session(&self, session_id: &str) -> Result<Vec<Ticket>, NovyraError>;

    // --- website content ---

    async fn active_pages(&self) -> Result<Vec<WebsitePage>, NovyraError>;

    async fn upsert_page(&self, url: &str, title: &str, content: &str)
    -> Result<i64, NovyraError>;

    // --- notifications ---

    async fn notifications_for(&self, user_id: i64) -> Result<Vec<Notification>, NovyraError>;
}
