// SPDX-FileCopyrightText: 2026 Minwon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pause-set operations.

use minwon_core::MinwonError;
use minwon_core::types::PausedSender;
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};

/// Add the sender to the pause set. Returns `true` if it was not already paused.
pub async fn pause(db: &Database, sender_id: &str, paused_at: &str) -> Result<bool, MinwonError> {
    let sender_id = sender_id.to_string();
    let paused_at = paused_at.to_string();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let n = conn.execute(
                "INSERT OR IGNORE INTO paused_senders (sender_id, paused_at) VALUES (?1, ?2)",
                params![sender_id, paused_at],
            )?;
            Ok(n > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Remove the sender from the pause set. Returns `true` if it was paused.
pub async fn resume(db: &Database, sender_id: &str) -> Result<bool, MinwonError> {
    let sender_id = sender_id.to_string();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let n = conn.execute(
                "DELETE FROM paused_senders WHERE sender_id = ?1",
                params![sender_id],
            )?;
            Ok(n > 0)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn is_paused(db: &Database, sender_id: &str) -> Result<bool, MinwonError> {
    let sender_id = sender_id.to_string();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let found = conn
                .query_row(
                    "SELECT 1 FROM paused_senders WHERE sender_id = ?1",
                    params![sender_id],
                    |_| Ok(()),
                )
                .optional()?;
            Ok(found.is_some())
        })
        .await
        .map_err(map_tr_err)
}

/// List the pause set, oldest pause first.
pub async fn list(db: &Database) -> Result<Vec<PausedSender>, MinwonError> {
    db.connection()
        .call(|conn| -> Result<Vec<PausedSender>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT sender_id, paused_at FROM paused_senders
                 ORDER BY paused_at ASC, sender_id ASC",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(PausedSender {
                    sender_id: row.get(0)?,
                    paused_at: row.get(1)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}
