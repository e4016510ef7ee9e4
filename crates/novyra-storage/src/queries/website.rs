// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use novyra_core::NovyraError;
use rusqlite::params;

use crate::database::Database;
use crate::models::WebsitePage;

pub async fn active_pages(db: &Database) -> Result<Vec<WebsitePage>, NovyraError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, url, title, content, is_active FROM website_content
                 WHERE is_active = 1 ORDER BY id",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(WebsitePage {
                    id: row.get(0)?,
                    url: row.get(1)?,
                    title: row.get(2)?,
                    content: row.get(3)?,
                    is_active: row.get(4)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert or refresh the page stored under `url`, returning its row id.
pub async fn upsert_page(db: &Database, url: &str, title: &str, content: &str) -> Result<i64, NovyraError> {
    let (url, title, content) = (url.to_string(), title.to_string(), content.to_string());
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "INSERT INTO website_content (url, title, content) VALUES (?1, ?2, ?3)
                 ON CONFLICT(url) DO UPDATE SET
                    title = excluded.title,
                    content = excluded.content,
                    is_active = 1,
                    updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 RETURNING id",
                params![url, title, content],
                |row| row.get(0),
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}
