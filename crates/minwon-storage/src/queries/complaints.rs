// SPDX-FileCopyrightText: 2026 Minwon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Complaint log operations.

use std::str::FromStr;

use minwon_core::MinwonError;
use minwon_core::types::{ComplaintLogEntry, ComplaintStatus};
use rusqlite::params;
use rusqlite::types::Type;

use crate::database::{Database, map_tr_err};

/// Append an entry to the complaint log.
pub async fn append_entry(db: &Database, entry: &ComplaintLogEntry) -> Result<(), MinwonError> {
    let entry = entry.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO complaint_log (created_at, sender_id, message, reply, is_urgent, status)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    entry.timestamp,
                    entry.sender_id,
                    entry.message,
                    entry.reply,
                    entry.is_urgent,
                    entry.status.to_string(),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Read the complaint log in append order, optionally urgent entries only.
pub async fn read_entries(
    db: &Database,
    urgent_only: bool,
) -> Result<Vec<ComplaintLogEntry>, MinwonError> {
    db.connection()
        .call(move |conn| -> Result<Vec<ComplaintLogEntry>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT created_at, sender_id, message, reply, is_urgent, status
                 FROM complaint_log
                 WHERE (?1 = 0 OR is_urgent = 1)
                 ORDER BY id ASC",
            )?;
            let rows = stmt.query_map(params![urgent_only], |row| {
                let status: String = row.get(5)?;
                let status = ComplaintStatus::from_str(&status).map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e))
                })?;
                Ok(ComplaintLogEntry {
                    timestamp: row.get(0)?,
                    sender_id: row.get(1)?,
                    message: row.get(2)?,
                    reply: row.get(3)?,
                    is_urgent: row.get(4)?,
                    status,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}
