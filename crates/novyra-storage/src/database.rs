// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use std::path::Path;

use novyra_core::NovyraError;
use tracing::debug;

use crate::migrations::run_migrations;

/// Convert a tokio-rusqlite error into NovyraError::Storage.
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> NovyraError {
    NovyraError::Storage {
        source: Box::new(e),
    }
}

fn storage_err(e: impl std::error::Error + Send + Sync + 'static) -> NovyraError {
    NovyraError::Storage {
        source: Box::new(e),
    }
}

/// Handle to the engine database. This is the single writer.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (creating if needed) the database at `path` in WAL mode and bring
    /// the schema up to date.
    pub async fn open(path: &str) -> Result<Self, NovyraError> {
        Self::open_with(path, true).await
    }

    /// Like [`open`](Self::open) with explicit journal mode.
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, NovyraError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(storage_err)?;
        }

        // Schema changes run once on a short-lived blocking connection so the
        // long-lived writer never sees a half-migrated database.
        let migrate_path = path.to_string();
        tokio::task::spawn_blocking(move || prepare_schema(&migrate_path, wal_mode))
            .await
            .map_err(|e| NovyraError::Internal(format!("migration task failed: {e}")))??;

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(storage_err)?;

        conn.call(|conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch(
                "PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;
                 PRAGMA synchronous = NORMAL;",
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        debug!(path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// The underlying async connection. Every query goes through `call()`.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL and close the connection.
    pub async fn close(self) -> Result<(), NovyraError> {
        self.checkpoint().await?;
        self.conn.close().await.map_err(storage_err)?;
        debug!("database closed");
        Ok(())
    }

    /// Fold the WAL back into the main database file.
    pub async fn checkpoint(&self) -> Result<(), NovyraError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}

fn prepare_schema(path: &str, wal_mode: bool) -> Result<(), NovyraError> {
    let mut conn = rusqlite::Connection::open(path).map_err(storage_err)?;
    let journal = if wal_mode { "WAL" } else { "DELETE" };
    conn.pragma_update(None, "journal_mode", journal)
        .map_err(storage_err)?;
    conn.pragma_update(None, "foreign_keys", "ON")
        .map_err(storage_err)?;
    run_migrations(&mut conn)
}
