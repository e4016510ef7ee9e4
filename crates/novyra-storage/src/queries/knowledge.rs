// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Knowledge base entries and the conversation learning log.

use novyra_core::types::{NewKnowledgeEntry, NewLearningRecord};
use novyra_core::NovyraError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{parse_column, KnowledgeEntry, LearningRecord};

const KNOWLEDGE_COLUMNS: &str = "id, title, category, keywords, content, intent, is_active, priority";

const LEARNING_COLUMNS: &str = "id, session_id, user_message, ai_response, intent, confidence, \
     was_helpful, escalated, created_at";

fn knowledge_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<KnowledgeEntry> {
    Ok(KnowledgeEntry {
        id: row.get(0)?,
        title: row.get(1)?,
        category: parse_column(2, row.get(2)?)?,
        keywords: row.get(3)?,
        content: row.get(4)?,
        intent: row.get(5)?,
        is_active: row.get(6)?,
        priority: row.get(7)?,
    })
}

fn learning_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<LearningRecord> {
    let confidence: f64 = row.get(5)?;
    Ok(LearningRecord {
        id: row.get(0)?,
        session_id: row.get(1)?,
        user_message: row.get(2)?,
        ai_response: row.get(3)?,
        intent: row.get(4)?,
        confidence: confidence as f32,
        was_helpful: row.get(6)?,
        escalated: row.get(7)?,
        created_at: row.get(8)?,
    })
}

/// Active entries, highest priority first.
pub async fn active_knowledge(db: &Database) -> Result<Vec<KnowledgeEntry>, NovyraError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {KNOWLEDGE_COLUMNS} FROM knowledge_base
                 WHERE is_active = 1 ORDER BY priority DESC, id ASC"
            ))?;
            let rows = stmt.query_map([], knowledge_from_row)?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn insert_knowledge(db: &Database, entry: &NewKnowledgeEntry) -> Result<i64, NovyraError> {
    let entry = entry.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO knowledge_base (title, category, keywords, content, intent, priority)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    entry.title,
                    entry.category.to_string(),
                    entry.keywords,
                    entry.content,
                    entry.intent,
                    entry.priority,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert unless an entry with the same title already exists.
pub async fn insert_knowledge_if_absent(
    db: &Database,
    entry: &NewKnowledgeEntry,
) -> Result<bool, NovyraError> {
    let entry = entry.clone();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "INSERT INTO knowledge_base (title, category, keywords, content, intent, priority)
                 SELECT ?1, ?2, ?3, ?4, ?5, ?6
                 WHERE NOT EXISTS (SELECT 1 FROM knowledge_base WHERE title = ?1)",
                params![
                    entry.title,
                    entry.category.to_string(),
                    entry.keywords,
                    entry.content,
                    entry.intent,
                    entry.priority,
                ],
            )?;
            Ok(changed == 1)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn count_knowledge(db: &Database) -> Result<u64, NovyraError> {
    db.connection()
        .call(|conn| {
            let n: i64 = conn.query_row("SELECT COUNT(*) FROM knowledge_base", [], |row| row.get(0))?;
            Ok(n.max(0) as u64)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn record_learning(db: &Database, record: &NewLearningRecord) -> Result<i64, NovyraError> {
    let record = record.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO conversation_learning
                    (session_id, user_message, ai_response, intent, confidence, escalated)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.session_id,
                    record.user_message,
                    record.ai_response,
                    record.intent,
                    f64::from(record.confidence),
                    record.escalated,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Helpful and non-escalated records, most confident then newest first.
pub async fn helpful_learning(db: &Database, limit: usize) -> Result<Vec<LearningRecord>, NovyraError> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {LEARNING_COLUMNS} FROM conversation_learning
                 WHERE was_helpful = 1 AND escalated = 0
                 ORDER BY confidence DESC, created_at DESC, id DESC
                 LIMIT ?1"
            ))?;
            let rows = stmt.query_map(params![limit], learning_from_row)?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn helpful_intents(db: &Database) -> Result<Vec<String>, NovyraError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT DISTINCT intent FROM conversation_learning
                 WHERE was_helpful = 1 AND intent IS NOT NULL AND intent != ''
                 ORDER BY intent",
            )?;
            let rows = stmt.query_map([], |row| row.get(0))?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn set_learning_feedback(db: &Database, id: i64, helpful: bool) -> Result<bool, NovyraError> {
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE conversation_learning SET was_helpful = ?2 WHERE id = ?1",
                params![id, helpful],
            )?;
            Ok(changed == 1)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
