// SPDX-FileCopyrightText: 2026 Minwon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for conversation history, the complaint log, and
//! the pause set.

use async_trait::async_trait;

use crate::error::MinwonError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ComplaintLogEntry, ConversationTurn, PausedSender, UserState};

/// Adapter for the three record stores the relay keeps.
///
/// Turns and log entries are append-only. The pause set is the only mutable
/// per-sender state and is changed by operator actions alone.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), MinwonError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), MinwonError>;

    // --- History ---

    /// Appends a turn to the end of the sender's history.
    async fn append_turn(&self, sender_id: &str, turn: &ConversationTurn)
    -> Result<(), MinwonError>;

    /// Returns the sender's whole history in append order.
    async fn read_turns(&self, sender_id: &str) -> Result<Vec<ConversationTurn>, MinwonError>;

    /// Returns at most `limit` of the sender's most recent turns, oldest first.
    async fn recent_turns(
        &self,
        sender_id: &str,
        limit: usize,
    ) -> Result<Vec<ConversationTurn>, MinwonError>;

    /// Deletes the sender's history. Returns the number of turns removed.
    async fn delete_turns(&self, sender_id: &str) -> Result<u64, MinwonError>;

    /// Returns every sender's state, ordered by sender id.
    ///
    /// Senders that are paused but have no history are included.
    async fn read_all_histories(&self) -> Result<Vec<UserState>, MinwonError>;

    // --- Complaint log ---

    /// Appends an entry to the complaint log.
    async fn append_log_entry(&self, entry: &ComplaintLogEntry) -> Result<(), MinwonError>;

    /// Returns the complaint log in append order, optionally urgent entries only.
    async fn read_log(&self, urgent_only: bool) -> Result<Vec<ComplaintLogEntry>, MinwonError>;

    // --- Pause set ---

    /// Sets or clears the sender's pause flag. Idempotent.
    ///
    /// Returns `true` when the stored state changed.
    async fn set_paused(&self, sender_id: &str, paused: bool) -> Result<bool, MinwonError>;

    /// Returns whether the sender is currently paused.
    async fn is_paused(&self, sender_id: &str) -> Result<bool, MinwonError>;

    /// Lists the pause set, oldest pause first.
    async fn list_paused(&self) -> Result<Vec<PausedSender>, MinwonError>;
}
