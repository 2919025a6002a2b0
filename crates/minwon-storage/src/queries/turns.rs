// SPDX-FileCopyrightText: 2026 Minwon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation history operations.

use minwon_core::MinwonError;
use minwon_core::types::ConversationTurn;
use rusqlite::params;

use crate::database::{Database, map_tr_err};

fn row_to_turn(row: &rusqlite::Row<'_>) -> rusqlite::Result<ConversationTurn> {
    Ok(ConversationTurn {
        user_message: row.get(0)?,
        assistant_reply: row.get(1)?,
        timestamp: row.get(2)?,
    })
}

/// Append a turn to the sender's history.
pub async fn append_turn(
    db: &Database,
    sender_id: &str,
    turn: &ConversationTurn,
) -> Result<(), MinwonError> {
    let sender_id = sender_id.to_string();
    let turn = turn.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO conversation_turns (sender_id, user_message, assistant_reply, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![sender_id, turn.user_message, turn.assistant_reply, turn.timestamp],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Read the sender's full history in append order.
pub async fn read_turns(db: &Database, sender_id: &str) -> Result<Vec<ConversationTurn>, MinwonError> {
    let sender_id = sender_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<ConversationTurn>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT user_message, assistant_reply, created_at
                 FROM conversation_turns WHERE sender_id = ?1
                 ORDER BY id ASC",
            )?;
            let rows = stmt.query_map(params![sender_id], row_to_turn)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Read at most `limit` of the sender's most recent turns, oldest first.
pub async fn recent_turns(
    db: &Database,
    sender_id: &str,
    limit: usize,
) -> Result<Vec<ConversationTurn>, MinwonError> {
    let sender_id = sender_id.to_string();
    let limit = super::sql_limit(limit);
    db.connection()
        .call(move |conn| -> Result<Vec<ConversationTurn>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT user_message, assistant_reply, created_at FROM (
                     SELECT id, user_message, assistant_reply, created_at
                     FROM conversation_turns WHERE sender_id = ?1
                     ORDER BY id DESC LIMIT ?2
                 ) ORDER BY id ASC",
            )?;
            let rows = stmt.query_map(params![sender_id, limit], row_to_turn)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Delete every turn of the sender. Returns the number of rows removed.
pub async fn delete_turns(db: &Database, sender_id: &str) -> Result<u64, MinwonError> {
    let sender_id = sender_id.to_string();
    db.connection()
        .call(move |conn| -> Result<u64, rusqlite::Error> {
            let n = conn.execute(
                "DELETE FROM conversation_turns WHERE sender_id = ?1",
                params![sender_id],
            )?;
            Ok(n as u64)
        })
        .await
        .map_err(map_tr_err)
}

/// Read every sender's history, grouped by sender and ordered by sender id.
pub async fn read_all_turns(
    db: &Database,
) -> Result<Vec<(String, Vec<ConversationTurn>)>, MinwonError> {
    db.connection()
        .call(|conn| -> Result<Vec<(String, Vec<ConversationTurn>)>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT sender_id, user_message, assistant_reply, created_at
                 FROM conversation_turns ORDER BY sender_id ASC, id ASC",
            )?;
            let mut rows = stmt.query([])?;
            let mut grouped: Vec<(String, Vec<ConversationTurn>)> = Vec::new();
            while let Some(row) = rows.next()? {
                let sender_id: String = row.get(0)?;
                let turn = ConversationTurn {
                    user_message: row.get(1)?,
                    assistant_reply: row.get(2)?,
                    timestamp: row.get(3)?,
                };
                match grouped.last_mut() {
                    Some((last, turns)) if *last == sender_id => turns.push(turn),
                    _ => grouped.push((sender_id, vec![turn])),
                }
            }
            Ok(grouped)
        })
        .await
        .map_err(map_tr_err)
}
