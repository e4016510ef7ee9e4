// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Staff notification inbox.

use novyra_core::types::NewNotification;
use novyra_core::NovyraError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{parse_column, Notification};

pub async fn insert_notification(db: &Database, n: &NewNotification) -> Result<i64, NovyraError> {
    let n = n.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO notifications (user_id, kind, title, message, session_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![n.user_id, n.kind.to_string(), n.title, n.message, n.session_id],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// A user's notifications, newest first.
pub async fn notifications_for(db: &Database, user_id: i64) -> Result<Vec<Notification>, NovyraError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, kind, title, message, session_id, is_read, created_at
                 FROM notifications WHERE user_id = ?1
                 ORDER BY created_at DESC, id DESC",
            )?;
            let rows = stmt.query_map(params![user_id], |row| {
                Ok(Notification {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    kind: parse_column(2, row.get(2)?)?,
                    title: row.get(3)?,
                    message: row.get(4)?,
                    session_id: row.get(5)?,
                    is_read: row.get(6)?,
                    created_at: row.get(7)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::agents::create_staff_user;
    use novyra_core::types::{NewStaffUser, NotificationKind};
    use tempfile::tempdir;

    #[tokio::test]
    async fn notifications_are_listed_newest_first() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("test.db").to_str().unwrap())
            .await
            .unwrap();
        let user = create_staff_user(
            &db,
            &NewStaffUser {
                username: "ada".into(),
                full_name: None,
                email: None,
            },
        )
        .await
        .unwrap();

        for title in ["first", "second"] {
            insert_notification(
                &db,
                &NewNotification {
                    user_id: user.id,
                    kind: NotificationKind::Escalation,
                    title: title.into(),
                    message: "Customer waiting".into(),
                    session_id: None,
                },
            )
            .await
            .unwrap();
        }

        let inbox = notifications_for(&db, user.id).await.unwrap();
        assert_eq!(inbox.len(), 2);
        assert_eq!(inbox[0].title, "second");
        assert_eq!(inbox[0].kind, NotificationKind::Escalation);
        assert!(!inbox[0].is_read);
    }
}
