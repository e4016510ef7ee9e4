// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`ChatStore`] and [`NotificationSink`] traits.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use novyra_config::model::StorageConfig;
use novyra_core::types::{
    AgentProfile, ChatMessage, ChatSession, ClientMeta, KnowledgeEntry, LearningRecord,
    NewKnowledgeEntry, NewLearningRecord, NewMessage, NewNotification, NewStaffUser, NewTicket,
    Notification, SessionPatch, SessionStatus, StaffUser, Ticket, WebsitePage,
};
use novyra_core::{
    AdapterType, ChatStore, HealthStatus, NotificationSink, NovyraError, PluginAdapter,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed chat store.
///
/// Wraps a [`Database`] handle and delegates to the typed query modules. The
/// database is opened on the first call to [`initialize`](Self::initialize).
pub struct SqliteStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStore {
    /// The database connection is not opened until [`initialize`](Self::initialize) is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Construct and initialize in one step.
    pub async fn open(config: StorageConfig) -> Result<Self, NovyraError> {
        let store = Self::new(config);
        store.initialize().await?;
        Ok(store)
    }

    /// Opens the database and applies pending migrations.
    pub async fn initialize(&self) -> Result<(), NovyraError> {
        let path = self.config.database_path.clone();
        let db = Database::open_with(&path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| NovyraError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite store initialized");
        Ok(())
    }

    /// Checkpoint the WAL. The connection closes when the store is dropped.
    pub async fn close(&self) -> Result<(), NovyraError> {
        self.db()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    fn db(&self) -> Result<&Database, NovyraError> {
        self.db.get().ok_or_else(|| NovyraError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, NovyraError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), NovyraError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl ChatStore for SqliteStore {
    // --- sessions ---

    async fn get_session(&self, id: &str) -> Result<Option<ChatSession>, NovyraError> {
        queries::sessions::get_session(self.db()?, id).await
    }

    async fn get_or_create_session(
        &self,
        id: &str,
        meta: &ClientMeta,
    ) -> Result<(ChatSession, bool), NovyraError> {
        queries::sessions::get_or_create_session(self.db()?, id, meta).await
    }

    async fn update_session(&self, id: &str, patch: &SessionPatch) -> Result<(), NovyraError> {
        queries::sessions::update_session(self.db()?, id, patch).await
    }

    async fn finish_session(&self, id: &str, status: SessionStatus) -> Result<bool, NovyraError> {
        queries::sessions::finish_session(self.db()?, id, status).await
    }

    async fn rate_session(
        &self,
        id: &str,
        rating: u8,
        feedback: Option<&str>,
    ) -> Result<bool, NovyraError> {
        queries::sessions::rate_session(self.db()?, id, rating, feedback).await
    }

    async fn attach_agent(&self, session_id: &str, agent_id: i64) -> Result<bool, NovyraError> {
        queries::sessions::attach_agent(self.db()?, session_id, agent_id).await
    }

    // --- messages ---

    async fn append_message(&self, msg: &NewMessage) -> Result<ChatMessage, NovyraError> {
        queries::messages::append_message(self.db()?, msg).await
    }

    async fn recent_messages(
        &self,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, NovyraError> {
        queries::messages::recent_messages(self.db()?, session_id, limit).await
    }

    async fn list_messages(&self, session_id: &str) -> Result<Vec<ChatMessage>, NovyraError> {
        queries::messages::list_messages(self.db()?, session_id).await
    }

    async fn latest_user_message(
        &self,
        session_id: &str,
    ) -> Result<Option<ChatMessage>, NovyraError> {
        queries::messages::latest_user_message(self.db()?, session_id).await
    }

    // --- staff and agents ---

    async fn create_staff_user(&self, user: &NewStaffUser) -> Result<StaffUser, NovyraError> {
        queries::agents::create_staff_user(self.db()?, user).await
    }

    async fn get_staff_user(&self, id: i64) -> Result<Option<StaffUser>, NovyraError> {
        queries::agents::get_staff_user(self.db()?, id).await
    }

    async fn list_active_staff(&self) -> Result<Vec<StaffUser>, NovyraError> {
        queries::agents::list_active_staff(self.db()?).await
    }

    async fn ensure_agent_profile(
        &self,
        staff_user_id: i64,
        default_max: u32,
    ) -> Result<AgentProfile, NovyraError> {
        queries::agents::ensure_agent_profile(self.db()?, staff_user_id, default_max).await
    }

    async fn get_agent(&self, id: i64) -> Result<Option<AgentProfile>, NovyraError> {
        queries::agents::get_agent(self.db()?, id).await
    }

    async fn agent_candidates(&self) -> Result<Vec<AgentProfile>, NovyraError> {
        queries::agents::agent_candidates(self.db()?).await
    }

    async fn any_available_agent(&self) -> Result<Option<AgentProfile>, NovyraError> {
        queries::agents::any_available_agent(self.db()?).await
    }

    async fn set_agent_availability(
        &self,
        agent_id: i64,
        available: bool,
    ) -> Result<(), NovyraError> {
        queries::agents::set_agent_availability(self.db()?, agent_id, available).await
    }

    async fn try_reserve_agent(&self, agent_id: i64) -> Result<bool, NovyraError> {
        queries::agents::try_reserve_agent(self.db()?, agent_id).await
    }

    async fn release_agent_load(&self, agent_id: i64, handled: bool) -> Result<(), NovyraError> {
        queries::agents::release_agent_load(self.db()?, agent_id, handled).await
    }

    // --- knowledge and learning ---

    async fn active_knowledge(&self) -> Result<Vec<KnowledgeEntry>, NovyraError> {
        queries::knowledge::active_knowledge(self.db()?).await
    }

    async fn insert_knowledge(&self, entry: &NewKnowledgeEntry) -> Result<i64, NovyraError> {
        queries::knowledge::insert_knowledge(self.db()?, entry).await
    }

    async fn insert_knowledge_if_absent(
        &self,
        entry: &NewKnowledgeEntry,
    ) -> Result<bool, NovyraError> {
        queries::knowledge::insert_knowledge_if_absent(self.db()?, entry).await
    }

    async fn count_knowledge(&self) -> Result<u64, NovyraError> {
        queries::knowledge::count_knowledge(self.db()?).await
    }

    async fn record_learning(&self, record: &NewLearningRecord) -> Result<i64, NovyraError> {
        queries::knowledge::record_learning(self.db()?, record).await
    }

    async fn helpful_learning(&self, limit: usize) -> Result<Vec<LearningRecord>, NovyraError> {
        queries::knowledge::helpful_learning(self.db()?, limit).await
    }

    async fn helpful_intents(&self) -> Result<Vec<String>, NovyraError> {
        queries::knowledge::helpful_intents(self.db()?).await
    }

    async fn set_learning_feedback(&self, id: i64, helpful: bool) -> Result<bool, NovyraError> {
        queries::knowledge::set_learning_feedback(self.db()?, id, helpful).await
    }

    // --- tickets ---

    async fn create_ticket(&self, ticket: &NewTicket) -> Result<Ticket, NovyraError> {
        queries::tickets::create_ticket(self.db()?, ticket).await
    }

    async fn mark_ticket_notified(&self, id: i64) -> Result<(), NovyraError> {
        queries::tickets::mark_ticket_notified(self.db()?, id).await
    }

    async fn tickets_for_session(&self, session_id: &str) -> Result<Vec<Ticket>, NovyraError> {
        queries::tickets::tickets_for_session(self.db()?, session_id).await
    }

    // --- website content ---

    async fn active_pages(&self) -> Result<Vec<WebsitePage>, NovyraError> {
        queries::website::active_pages(self.db()?).await
    }

    async fn upsert_page(
        &self,
        url: &str,
        title: &str,
        content: &str,
    ) -> Result<i64, NovyraError> {
        queries::website::upsert_page(self.db()?, url, title, content).await
    }

    // --- notifications ---

    async fn notifications_for(&self, user_id: i64) -> Result<Vec<Notification>, NovyraError> {
        queries::notifications::notifications_for(self.db()?, user_id).await
    }
}

#[async_trait]
impl NotificationSink for SqliteStore {
    async fn notify(&self, notification: &NewNotification) -> Result<(), NovyraError> {
        let id = queries::notifications::insert_notification(self.db()?, notification).await?;
        debug!(notification_id = id, user_id = notification.user_id, "notification stored");
        Ok(())
    }
}
