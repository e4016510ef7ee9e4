// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Staff users and agent routing profiles.
//!
//! `current_chats` is only touched by the conditional updates in
//! [`try_reserve_agent`] and [`release_agent_load`]; the table's CHECK
//! constraint rejects anything that would leave `0..=max_concurrent_chats`.

use novyra_core::types::NewStaffUser;
use novyra_core::NovyraError;
use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::models::{u32_column, AgentProfile, StaffUser};

const STAFF_COLUMNS: &str = "id, username, full_name, email, is_staff, is_active";

const AGENT_SELECT: &str = "SELECT a.id, a.staff_user_id, u.username,
        COALESCE(NULLIF(TRIM(u.full_name), ''), u.username), u.email,
        a.is_available, a.max_concurrent_chats, a.current_chats,
        a.total_chats_handled, a.average_rating
     FROM agents a JOIN staff_users u ON u.id = a.staff_user_id";

fn staff_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StaffUser> {
    Ok(StaffUser {
        id: row.get(0)?,
        username: row.get(1)?,
        full_name: row.get(2)?,
        email: row.get(3)?,
        is_staff: row.get(4)?,
        is_active: row.get(5)?,
    })
}

fn agent_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AgentProfile> {
    let rating: f64 = row.get(9)?;
    Ok(AgentProfile {
        id: row.get(0)?,
        staff_user_id: row.get(1)?,
        username: row.get(2)?,
        display_name: row.get(3)?,
        email: row.get(4)?,
        is_available: row.get(5)?,
        max_concurrent_chats: u32_column(row, 6)?,
        current_chats: u32_column(row, 7)?,
        total_chats_handled: u32_column(row, 8)?,
        average_rating: rating as f32,
    })
}

pub async fn create_staff_user(db: &Database, user: &NewStaffUser) -> Result<StaffUser, NovyraError> {
    let user = user.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO staff_users (username, full_name, email) VALUES (?1, ?2, ?3)",
                params![user.username, user.full_name, user.email],
            )?;
            let id = conn.last_insert_rowid();
            conn.query_row(
                &format!("SELECT {STAFF_COLUMNS} FROM staff_users WHERE id = ?1"),
                params![id],
                staff_from_row,
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn get_staff_user(db: &Database, id: i64) -> Result<Option<StaffUser>, NovyraError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {STAFF_COLUMNS} FROM staff_users WHERE id = ?1"),
                params![id],
                staff_from_row,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Active staff members, oldest account first.
pub async fn list_active_staff(db: &Database) -> Result<Vec<StaffUser>, NovyraError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {STAFF_COLUMNS} FROM staff_users
                 WHERE is_staff = 1 AND is_active = 1 ORDER BY id"
            ))?;
            let rows = stmt.query_map([], staff_from_row)?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Upsert-on-first-use: returns the staff user's agent profile, creating an
/// available one with `default_max` slots if it does not exist yet.
pub async fn ensure_agent_profile(
    db: &Database,
    staff_user_id: i64,
    default_max: u32,
) -> Result<AgentProfile, NovyraError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO agents (staff_user_id, max_concurrent_chats) VALUES (?1, ?2)
                 ON CONFLICT(staff_user_id) DO NOTHING",
                params![staff_user_id, default_max],
            )?;
            conn.query_row(
                &format!("{AGENT_SELECT} WHERE a.staff_user_id = ?1"),
                params![staff_user_id],
                agent_from_row,
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn get_agent(db: &Database, id: i64) -> Result<Option<AgentProfile>, NovyraError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("{AGENT_SELECT} WHERE a.id = ?1"),
                params![id],
                agent_from_row,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Available agents of active staff that still have a free slot, least
/// loaded first.
pub async fn agent_candidates(db: &Database) -> Result<Vec<AgentProfile>, NovyraError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{AGENT_SELECT}
                 WHERE a.is_available = 1 AND u.is_active = 1
                   AND a.current_chats < a.max_concurrent_chats
                 ORDER BY a.current_chats ASC, a.id ASC"
            ))?;
            let rows = stmt.query_map([], agent_from_row)?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Any available agent of active staff, ignoring load.
pub async fn any_available_agent(db: &Database) -> Result<Option<AgentProfile>, NovyraError> {
    db.connection()
        .call(|conn| {
            conn.query_row(
                &format!(
                    "{AGENT_SELECT} WHERE a.is_available = 1 AND u.is_active = 1
                     ORDER BY a.current_chats ASC, a.id ASC LIMIT 1"
                ),
                [],
                agent_from_row,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn set_agent_availability(
    db: &Database,
    agent_id: i64,
    available: bool,
) -> Result<(), NovyraError> {
    let changed = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE agents SET is_available = ?2,
                    updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![agent_id, available],
            )
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if changed == 0 {
        return Err(NovyraError::NotFound {
            entity: "agent",
            id: agent_id.to_string(),
        });
    }
    Ok(())
}

/// Compare-and-increment: takes a slot only while one is free.
pub async fn try_reserve_agent(db: &Database, agent_id: i64) -> Result<bool, NovyraError> {
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE agents SET current_chats = current_chats + 1,
                    updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1 AND current_chats < max_concurrent_chats",
                params![agent_id],
            )?;
            Ok(changed == 1)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Give back a slot, never going below zero. `handled` counts the chat as done.
pub async fn release_agent_load(db: &Database, agent_id: i64, handled: bool) -> Result<(), NovyraError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE agents SET
                    current_chats = MAX(current_chats - 1, 0),
                    total_chats_handled = total_chats_handled + ?2,
                    updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![agent_id, i64::from(handled)],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::sessions::{attach_agent, get_or_create_session, get_session};
    use novyra_core::types::{ClientMeta, SessionStatus};
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn staff(username: &str) -> NewStaffUser {
        NewStaffUser {
            username: username.into(),
            full_name: None,
            email: Some(format!("{username}@example.com")),
        }
    }

    #[tokio::test]
    async fn ensure_agent_profile_is_idempotent() {
        let (db, _dir) = setup_db().await;
        let user = create_staff_user(&db, &staff("ada")).await.unwrap();

        let first = ensure_agent_profile(&db, user.id, 5).await.unwrap();
        let second = ensure_agent_profile(&db, user.id, 9).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.max_concurrent_chats, 5);
        assert_eq!(second.current_chats, 0);
        assert_eq!(second.display_name, "ada");
        assert!(second.is_available);
    }

    #[tokio::test]
    async fn reservation_stops_at_capacity() {
        let (db, _dir) = setup_db().await;
        let user = create_staff_user(&db, &staff("ada")).await.unwrap();
        let agent = ensure_agent_profile(&db, user.id, 2).await.unwrap();

        assert!(try_reserve_agent(&db, agent.id).await.unwrap());
        assert!(try_reserve_agent(&db, agent.id).await.unwrap());
        assert!(!try_reserve_agent(&db, agent.id).await.unwrap());

        let agent = get_agent(&db, agent.id).await.unwrap().unwrap();
        assert_eq!(agent.current_chats, 2);
        assert!(agent_candidates(&db).await.unwrap().is_empty());
        assert!(any_available_agent(&db).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn release_floors_at_zero() {
        let (db, _dir) = setup_db().await;
        let user = create_staff_user(&db, &staff("ada")).await.unwrap();
        let agent = ensure_agent_profile(&db, user.id, 2).await.unwrap();

        try_reserve_agent(&db, agent.id).await.unwrap();
        release_agent_load(&db, agent.id, true).await.unwrap();
        release_agent_load(&db, agent.id, true).await.unwrap();

        let agent = get_agent(&db, agent.id).await.unwrap().unwrap();
        assert_eq!(agent.current_chats, 0);
        assert_eq!(agent.total_chats_handled, 2);
    }

    #[tokio::test]
    async fn candidates_are_least_loaded_first() {
        let (db, _dir) = setup_db().await;
        let a = create_staff_user(&db, &staff("a")).await.unwrap();
        let b = create_staff_user(&db, &staff("b")).await.unwrap();
        let agent_a = ensure_agent_profile(&db, a.id, 5).await.unwrap();
        let agent_b = ensure_agent_profile(&db, b.id, 5).await.unwrap();
        try_reserve_agent(&db, agent_a.id).await.unwrap();

        let candidates = agent_candidates(&db).await.unwrap();
        assert_eq!(candidates[0].id, agent_b.id);
        assert_eq!(candidates[1].id, agent_a.id);

        set_agent_availability(&db, agent_b.id, false).await.unwrap();
        let candidates = agent_candidates(&db).await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, agent_a.id);
    }

    #[tokio::test]
    async fn attach_only_succeeds_once() {
        let (db, _dir) = setup_db().await;
        let a = create_staff_user(&db, &staff("a")).await.unwrap();
        let b = create_staff_user(&db, &staff("b")).await.unwrap();
        let agent_a = ensure_agent_profile(&db, a.id, 5).await.unwrap();
        let agent_b = ensure_agent_profile(&db, b.id, 5).await.unwrap();
        get_or_create_session(&db, "s1", &ClientMeta::default()).await.unwrap();

        assert!(attach_agent(&db, "s1", agent_a.id).await.unwrap());
        assert!(!attach_agent(&db, "s1", agent_b.id).await.unwrap());

        let s = get_session(&db, "s1").await.unwrap().unwrap();
        assert_eq!(s.assigned_agent_id, Some(agent_a.id));
        assert_eq!(s.status, SessionStatus::AgentAssigned);
    }

    #[tokio::test]
    async fn list_active_staff_orders_by_id() {
        let (db, _dir) = setup_db().await;
        create_staff_user(&db, &staff("first")).await.unwrap();
        create_staff_user(&db, &staff("second")).await.unwrap();

        let staff = list_active_staff(&db).await.unwrap();
        let names: Vec<_> = staff.iter().map(|s| s.username.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
        assert!(get_staff_user(&db, 999).await.unwrap().is_none());
    }
}
