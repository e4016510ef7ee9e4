// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transcript operations. Messages are append-only and ordered by creation
//! time, ties broken by row id.

use novyra_core::types::NewMessage;
use novyra_core::NovyraError;
use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::models::{parse_column, ChatMessage};

const MESSAGE_COLUMNS: &str = "id, session_id, message_type, content, sender_id, \
     ai_confidence, intent_detected, is_read, created_at";

fn message_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ChatMessage> {
    let confidence: Option<f64> = row.get(5)?;
    Ok(ChatMessage {
        id: row.get(0)?,
        session_id: row.get(1)?,
        message_type: parse_column(2, row.get(2)?)?,
        content: row.get(3)?,
        sender_id: row.get(4)?,
        ai_confidence: confidence.map(|c| c as f32),
        intent_detected: row.get(6)?,
        is_read: row.get(7)?,
        created_at: row.get(8)?,
    })
}

/// Append a message and return the stored row.
pub async fn append_message(db: &Database, msg: &NewMessage) -> Result<ChatMessage, NovyraError> {
    let msg = msg.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO messages (session_id, message_type, content, sender_id, ai_confidence, intent_detected)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    msg.session_id,
                    msg.message_type.to_string(),
                    msg.content,
                    msg.sender_id,
                    msg.ai_confidence.map(f64::from),
                    msg.intent_detected,
                ],
            )?;
            let id = conn.last_insert_rowid();
            conn.query_row(
                &format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"),
                params![id],
                message_from_row,
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The newest `limit` messages of a session, returned oldest first.
pub async fn recent_messages(
    db: &Database,
    session_id: &str,
    limit: usize,
) -> Result<Vec<ChatMessage>, NovyraError> {
    let session_id = session_id.to_string();
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM (
                    SELECT {MESSAGE_COLUMNS} FROM messages WHERE session_id = ?1
                    ORDER BY created_at DESC, id DESC LIMIT ?2
                 ) ORDER BY created_at ASC, id ASC"
            ))?;
            let rows = stmt.query_map(params![session_id, limit], message_from_row)?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Full transcript in chronological order.
pub async fn list_messages(db: &Database, session_id: &str) -> Result<Vec<ChatMessage>, NovyraError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages WHERE session_id = ?1
                 ORDER BY created_at ASC, id ASC"
            ))?;
            let rows = stmt.query_map(params![session_id], message_from_row)?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn latest_user_message(
    db: &Database,
    session_id: &str,
) -> Result<Option<ChatMessage>, NovyraError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!(
                    "SELECT {MESSAGE_COLUMNS} FROM messages
                     WHERE session_id = ?1 AND message_type = 'user'
                     ORDER BY created_at DESC, id DESC LIMIT 1"
                ),
                params![session_id],
                message_from_row,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}
