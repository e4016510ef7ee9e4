// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Support tickets.

use novyra_core::types::NewTicket;
use novyra_core::NovyraError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{parse_column, Ticket};

const TICKET_COLUMNS: &str = "id, ticket_number, session_id, title, description, status, \
     priority, customer_notified, created_at";

fn ticket_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Ticket> {
    Ok(Ticket {
        id: row.get(0)?,
        ticket_number: row.get(1)?,
        session_id: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        status: parse_column(5, row.get(5)?)?,
        priority: parse_column(6, row.get(6)?)?,
        customer_notified: row.get(7)?,
        created_at: row.get(8)?,
    })
}

/// Insert a ticket. A duplicate ticket number fails on the UNIQUE constraint.
pub async fn create_ticket(db: &Database, ticket: &NewTicket) -> Result<Ticket, NovyraError> {
    let ticket = ticket.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO tickets (ticket_number, session_id, title, description, priority)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    ticket.ticket_number,
                    ticket.session_id,
                    ticket.title,
                    ticket.description,
                    ticket.priority.to_string(),
                ],
            )?;
            let id = conn.last_insert_rowid();
            conn.query_row(
                &format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE id = ?1"),
                params![id],
                ticket_from_row,
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn mark_ticket_notified(db: &Database, id: i64) -> Result<(), NovyraError> {
    let changed = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE tickets SET customer_notified = 1,
                    updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![id],
            )
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if changed == 0 {
        return Err(NovyraError::NotFound {
            entity: "ticket",
            id: id.to_string(),
        });
    }
    Ok(())
}

pub async fn tickets_for_session(db: &Database, session_id: &str) -> Result<Vec<Ticket>, NovyraError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TICKET_COLUMNS} FROM tickets WHERE session_id = ?1
                 ORDER BY created_at ASC, id ASC"
            ))?;
            let rows = stmt.query_map(params![session_id], ticket_from_row)?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::sessions::get_or_create_session;
    use novyra_core::types::{ClientMeta, TicketPriority, TicketStatus};
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        get_or_create_session(&db, "s1", &ClientMeta::default())
            .await
            .unwrap();
        (db, dir)
    }

    fn ticket(number: &str) -> NewTicket {
        NewTicket {
            ticket_number: number.into(),
            session_id: Some("s1".into()),
            title: "Support Request - pricing".into(),
            description: "How much is SEO?".into(),
            priority: TicketPriority::Medium,
        }
    }

    #[tokio::test]
    async fn create_ticket_defaults_to_open() {
        let (db, _dir) = setup_db().await;
        let t = create_ticket(&db, &ticket("TKT-20260101-ABC123")).await.unwrap();
        assert_eq!(t.status, TicketStatus::Open);
        assert_eq!(t.priority, TicketPriority::Medium);
        assert!(!t.customer_notified);

        mark_ticket_notified(&db, t.id).await.unwrap();
        let listed = tickets_for_session(&db, "s1").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].customer_notified);
    }

    #[tokio::test]
    async fn duplicate_ticket_number_is_rejected() {
        let (db, _dir) = setup_db().await;
        create_ticket(&db, &ticket("TKT-20260101-AAAAAA")).await.unwrap();
        assert!(create_ticket(&db, &ticket("TKT-20260101-AAAAAA")).await.is_err());
    }

    #[tokio::test]
    async fn mark_unknown_ticket_is_not_found() {
        let (db, _dir) = setup_db().await;
        let err = mark_ticket_notified(&db, 77).await.unwrap_err();
        assert!(matches!(err, NovyraError::NotFound { entity: "ticket", .. }));
    }
}
