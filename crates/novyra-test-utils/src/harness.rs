// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles a complete [`ChatEngine`] over a temp SQLite
//! database, a real [`SessionBus`], a [`RecordingMailer`] and a
//! [`FixedClock`]. An external responder is only wired in when requested.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use novyra_agent::{ChatEngine, EngineDeps, TurnResult};
use novyra_bus::SessionBus;
use novyra_config::NovyraConfig;
use novyra_config::model::StorageConfig;
use novyra_core::NovyraError;
use novyra_core::traits::ChatStore;
use novyra_core::types::{ClientMeta, NewStaffUser, StaffUser};
use novyra_storage::SqliteStore;

use crate::mock_responder::MockResponder;
use crate::recording::{FixedClock, RecordingMailer};

/// Monday 2026-10-19, 11:00 WAT: inside default business hours.
pub fn business_hours_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 10, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Monday 2026-10-19, 21:00 WAT: after closing.
pub fn after_hours_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 20, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    config: NovyraConfig,
    now: DateTime<Utc>,
    with_responder: bool,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            config: NovyraConfig::default(),
            now: business_hours_now(),
            with_responder: false,
        }
    }

    /// Route turns through a [`MockResponder`] before the rule-based matcher.
    pub fn with_mock_responder(mut self) -> Self {
        self.with_responder = true;
        self
    }

    /// Start the clock at `now`.
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Adjust the configuration before the engine is built.
    pub fn configure(mut self, f: impl FnOnce(&mut NovyraConfig)) -> Self {
        f(&mut self.config);
        self
    }

    pub async fn build(mut self) -> Result<TestHarness, NovyraError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| NovyraError::Storage { source: e.into() })?;
        self.config.storage = StorageConfig {
            database_path: temp_dir.path().join("test.db").to_string_lossy().to_string(),
            wal_mode: true,
        };

        let store = Arc::new(SqliteStore::open(self.config.storage.clone()).await?);
        let bus = Arc::new(SessionBus::new(self.config.bus.channel_capacity));
        let mailer = Arc::new(RecordingMailer::new());
        let clock = Arc::new(FixedClock::new(self.now));

        let mut deps = EngineDeps::new(store.clone(), store.clone(), mailer.clone(), bus.clone())
            .with_clock(clock.clone());

        let responder = self.with_responder.then(|| Arc::new(MockResponder::new()));
        if let Some(responder) = &responder {
            deps = deps.with_responder(responder.clone());
        }

        let engine = ChatEngine::new(&self.config, deps)?;

        Ok(TestHarness {
            engine,
            store,
            bus,
            mailer,
            clock,
            responder,
            config: self.config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with mock adapters and temp storage.
pub struct TestHarness {
    pub engine: ChatEngine,
    /// SQLite store (temp DB, cleaned up on drop).
    pub store: Arc<SqliteStore>,
    pub bus: Arc<SessionBus>,
    pub mailer: Arc<RecordingMailer>,
    pub clock: Arc<FixedClock>,
    /// Present when built with [`TestHarnessBuilder::with_mock_responder`].
    pub responder: Option<Arc<MockResponder>>,
    pub config: NovyraConfig,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Harness with defaults: no external responder, inside business hours.
    pub async fn new() -> Result<Self, NovyraError> {
        Self::builder().build().await
    }

    /// Creates an active staff member.
    pub async fn add_staff(
        &self,
        username: &str,
        full_name: &str,
        email: Option<&str>,
    ) -> Result<StaffUser, NovyraError> {
        self.store
            .create_staff_user(&NewStaffUser {
                username: username.to_string(),
                full_name: Some(full_name.to_string()),
                email: email.map(str::to_string),
            })
            .await
    }

    /// One customer message on `session_id`, without client metadata.
    pub async fn send(&self, session_id: &str, text: &str) -> Result<TurnResult, NovyraError> {
        self.engine
            .process_turn(Some(session_id), text, &ClientMeta::default())
            .await
    }

    pub async fn send_as(
        &self,
        session_id: &str,
        text: &str,
        meta: &ClientMeta,
    ) -> Result<TurnResult, NovyraError> {
        self.engine.process_turn(Some(session_id), text, meta).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builder_creates_working_environment() {
        let harness = TestHarness::new().await.unwrap();
        assert!(harness.responder.is_none());
        assert!(harness.store.list_active_staff().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn temp_db_is_unique_per_harness() {
        let h1 = TestHarness::new().await.unwrap();
        let h2 = TestHarness::new().await.unwrap();

        h1.send("s1", "hello").await.unwrap();
        assert!(h1.store.get_session("s1").await.unwrap().is_some());
        assert!(h2.store.get_session("s1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn mock_responder_answers_turns() {
        let harness = TestHarness::builder()
            .with_mock_responder()
            .build()
            .await
            .unwrap();

        let result = harness.send("s1", "tell me something").await.unwrap();
        assert_eq!(result.message, "mock response");
        assert_eq!(harness.responder.unwrap().requests().await.len(), 1);
    }
}
