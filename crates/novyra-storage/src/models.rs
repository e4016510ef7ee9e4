// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types live in `novyra-core::types`; this module re-exports
//! them and holds the row-decoding helpers shared by the query modules.

use std::str::FromStr;

use rusqlite::types::Type;

pub use novyra_core::types::{
    AgentProfile, ChatMessage, ChatSession, KnowledgeEntry, LearningRecord, Notification,
    StaffUser, Ticket, WebsitePage,
};

/// Decode a text column into a strum-backed enum.
pub(crate) fn parse_column<T>(idx: usize, value: String) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    T::from_str(&value).map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Decode a non-negative integer column.
pub(crate) fn u32_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<u32> {
    let value: i64 = row.get(idx)?;
    u32::try_from(value)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Integer, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use novyra_core::types::SessionStatus;

    #[test]
    fn parse_column_reports_bad_values() {
        let ok: SessionStatus = parse_column(0, "waiting_agent".into()).unwrap();
        assert_eq!(ok, SessionStatus::WaitingAgent);

        let err = parse_column::<SessionStatus>(3, "bogus".into()).unwrap_err();
        assert!(matches!(err, rusqlite::Error::FromSqlConversionFailure(3, Type::Text, _)));
    }
}
