// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-session turn serialization.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per session id. Turns for different sessions never wait
/// on each other. An entry lives only while a turn holds or waits on it.
#[derive(Debug, Default)]
pub struct SessionLocks {
    inner: DashMap<String, Arc<Mutex<()>>>,
}

/// Exclusive hold on one session. Dropping it releases the mutex and removes
/// the map entry when nobody else is queued on it.
#[derive(Debug)]
pub struct SessionTurn<'a> {
    locks: &'a SessionLocks,
    session_id: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for SessionTurn<'_> {
    fn drop(&mut self) {
        self.guard.take();
        self.locks.forget(&self.session_id);
    }
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other turn holds `session_id`.
    pub async fn lock(&self, session_id: &str) -> SessionTurn<'_> {
        let mutex = self
            .inner
            .entry(session_id.to_string())
            .or_default()
            .clone();
        let guard = mutex.lock_owned().await;
        SessionTurn {
            locks: self,
            session_id: session_id.to_string(),
            guard: Some(guard),
        }
    }

    /// Drops the mutex of `session_id` unless a turn still holds or awaits it.
    fn forget(&self, session_id: &str) {
        self.inner
            .remove_if(session_id, |_, mutex| Arc::strong_count(mutex) == 1);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
