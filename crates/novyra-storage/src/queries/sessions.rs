// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session rows: creation, customer details, state patches, lifecycle.

use novyra_core::types::{ClientMeta, SessionPatch, SessionStatus};
use novyra_core::NovyraError;
use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::models::{parse_column, ChatSession};

const SESSION_COLUMNS: &str = "id, user_ip, user_agent, customer_name, customer_email, \
     customer_phone, status, assigned_agent_id, last_intent, package_selected, \
     ticket_suggested, has_left_message, rating, feedback, created_at, updated_at, resolved_at";

fn session_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ChatSession> {
    let rating: Option<i64> = row.get(12)?;
    Ok(ChatSession {
        id: row.get(0)?,
        user_ip: row.get(1)?,
        user_agent: row.get(2)?,
        customer_name: row.get(3)?,
        customer_email: row.get(4)?,
        customer_phone: row.get(5)?,
        status: parse_column(6, row.get(6)?)?,
        assigned_agent_id: row.get(7)?,
        last_intent: row.get(8)?,
        package_selected: row.get(9)?,
        ticket_suggested: row.get(10)?,
        has_left_message: row.get(11)?,
        rating: rating.and_then(|r| u8::try_from(r).ok()),
        feedback: row.get(13)?,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
        resolved_at: row.get(16)?,
    })
}

fn select_session(conn: &rusqlite::Connection, id: &str) -> rusqlite::Result<Option<ChatSession>> {
    conn.query_row(
        &format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1"),
        params![id],
        session_from_row,
    )
    .optional()
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Get a session by ID.
pub async fn get_session(db: &Database, id: &str) -> Result<Option<ChatSession>, NovyraError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| select_session(conn, &id))
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch or create a session in one transaction. Supplied customer fields
/// overwrite stored ones; blank values are ignored.
pub async fn get_or_create_session(
    db: &Database,
    id: &str,
    meta: &ClientMeta,
) -> Result<(ChatSession, bool), NovyraError> {
    let id = id.to_string();
    let user_ip = non_blank(&meta.user_ip);
    let user_agent = non_blank(&meta.user_agent);
    let name = non_blank(&meta.customer_name);
    let email = non_blank(&meta.customer_email);
    let phone = non_blank(&meta.customer_phone);

    let found = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let created = tx.execute(
                "INSERT INTO sessions (id, user_ip, user_agent, customer_name, customer_email, customer_phone)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(id) DO NOTHING",
                params![id, user_ip, user_agent, name, email, phone],
            )? == 1;

            if !created && (name.is_some() || email.is_some() || phone.is_some()) {
                tx.execute(
                    "UPDATE sessions SET
                        customer_name = COALESCE(?2, customer_name),
                        customer_email = COALESCE(?3, customer_email),
                        customer_phone = COALESCE(?4, customer_phone),
                        updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                     WHERE id = ?1",
                    params![id, name, email, phone],
                )?;
            }

            let session = select_session(&tx, &id)?;
            tx.commit()?;
            Ok(session.map(|s| (s, created)))
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    found.ok_or_else(|| NovyraError::Internal("session vanished during creation".into()))
}

/// Apply a partial update. Errors with `NotFound` when the session is unknown.
pub async fn update_session(
    db: &Database,
    id: &str,
    patch: &SessionPatch,
) -> Result<(), NovyraError> {
    if patch.is_empty() {
        return Ok(());
    }
    let id_owned = id.to_string();
    let status = patch.status.map(|s| s.to_string());
    let last_intent = patch.last_intent.clone();
    let package = patch.package_selected.clone();
    let ticket_suggested = patch.ticket_suggested;
    let has_left_message = patch.has_left_message;

    let changed = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE sessions SET
                    status = COALESCE(?2, status),
                    last_intent = COALESCE(?3, last_intent),
                    package_selected = COALESCE(?4, package_selected),
                    ticket_suggested = COALESCE(?5, ticket_suggested),
                    has_left_message = COALESCE(?6, has_left_message),
                    updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![id_owned, status, last_intent, package, ticket_suggested, has_left_message],
            )
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    if changed == 0 {
        return Err(NovyraError::session_not_found(id));
    }
    Ok(())
}

/// Move a live session into a terminal state. Returns `false` if it was
/// already resolved or closed (or does not exist).
pub async fn finish_session(
    db: &Database,
    id: &str,
    status: SessionStatus,
) -> Result<bool, NovyraError> {
    let id = id.to_string();
    let status = status.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE sessions SET
                    status = ?2,
                    resolved_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now'),
                    updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1 AND status NOT IN ('resolved', 'closed')",
                params![id, status],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn rate_session(
    db: &Database,
    id: &str,
    rating: u8,
    feedback: Option<&str>,
) -> Result<bool, NovyraError> {
    let id = id.to_string();
    let feedback = feedback.map(str::to_string);
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE sessions SET rating = ?2, feedback = ?3,
                    updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![id, rating, feedback],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Attach an agent if the session has none. The `IS NULL` guard makes
/// concurrent attaches race safely: only one wins.
pub async fn attach_agent(db: &Database, session_id: &str, agent_id: i64) -> Result<bool, NovyraError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE sessions SET assigned_agent_id = ?2, status = 'agent_assigned',
                    updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1 AND assigned_agent_id IS NULL",
                params![session_id, agent_id],
            )?;
            Ok(changed == 1)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
