// SPDX-FileCopyrightText: 2026 Minwon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use minwon_config::model::StorageConfig;
use minwon_core::types::{ComplaintLogEntry, ConversationTurn, PausedSender, UserState};
use minwon_core::{AdapterType, HealthStatus, MinwonError, PluginAdapter, StorageAdapter};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// The database is opened on the first call to [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, MinwonError> {
        self.db.get().ok_or_else(|| MinwonError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, MinwonError> {
        let Ok(db) = self.db() else {
            return Ok(HealthStatus::Unhealthy("not initialized".into()));
        };
        match db.ping().await {
            Ok(()) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), MinwonError> {
        if self.db.get().is_some() {
            self.close().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), MinwonError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| MinwonError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), MinwonError> {
        self.db()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    // --- History ---

    async fn append_turn(
        &self,
        sender_id: &str,
        turn: &ConversationTurn,
    ) -> Result<(), MinwonError> {
        queries::turns::append_turn(self.db()?, sender_id, turn).await
    }

    async fn read_turns(&self, sender_id: &str) -> Result<Vec<ConversationTurn>, MinwonError> {
        queries::turns::read_turns(self.db()?, sender_id).await
    }

    async fn recent_turns(
        &self,
        sender_id: &str,
        limit: usize,
    ) -> Result<Vec<ConversationTurn>, MinwonError> {
        queries::turns::recent_turns(self.db()?, sender_id, limit).await
    }

    async fn delete_turns(&self, sender_id: &str) -> Result<u64, MinwonError> {
        queries::turns::delete_turns(self.db()?, sender_id).await
    }

    async fn read_all_histories(&self) -> Result<Vec<UserState>, MinwonError> {
        let db = self.db()?;
        let histories = queries::turns::read_all_turns(db).await?;
        let paused = queries::paused::list(db).await?;
        Ok(merge_histories(histories, paused))
    }

    // --- Complaint log ---

    async fn append_log_entry(&self, entry: &ComplaintLogEntry) -> Result<(), MinwonError> {
        queries::complaints::append_entry(self.db()?, entry).await
    }

    async fn read_log(&self, urgent_only: bool) -> Result<Vec<ComplaintLogEntry>, MinwonError> {
        queries::complaints::read_entries(self.db()?, urgent_only).await
    }

    // --- Pause set ---

    async fn set_paused(&self, sender_id: &str, paused: bool) -> Result<bool, MinwonError> {
        let db = self.db()?;
        if paused {
            queries::paused::pause(db, sender_id, &minwon_core::now_rfc3339()).await
        } else {
            queries::paused::resume(db, sender_id).await
        }
    }

    async fn is_paused(&self, sender_id: &str) -> Result<bool, MinwonError> {
        queries::paused::is_paused(self.db()?, sender_id).await
    }

    async fn list_paused(&self) -> Result<Vec<PausedSender>, MinwonError> {
        queries::paused::list(self.db()?).await
    }
}

/// Joins grouped histories with the pause set into sender-ordered states.
fn merge_histories(
    histories: Vec<(String, Vec<ConversationTurn>)>,
    paused: Vec<PausedSender>,
) -> Vec<UserState> {
    let mut states: std::collections::BTreeMap<String, UserState> = histories
        .into_iter()
        .map(|(sender_id, turns)| {
            let state = UserState {
                sender_id: sender_id.clone(),
                turns,
                paused: false,
            };
            (sender_id, state)
        })
        .collect();

    for p in paused {
        states
            .entry(p.sender_id.clone())
            .or_insert_with(|| UserState {
                sender_id: p.sender_id,
                turns: Vec::new(),
                paused: false,
            })
            .paused = true;
    }

    states.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    async fn initialized() -> (SqliteStorage, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("adapter.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));
        storage.initialize().await.unwrap();
        (storage, dir)
    }

    fn turn(q: &str) -> ConversationTurn {
        ConversationTurn {
            user_message: q.to_string(),
            assistant_reply: format!("re: {q}"),
            timestamp: minwon_core::now_rfc3339(),
        }
    }

    #[tokio::test]
    async fn sqlite_storage_implements_plugin_adapter() {
        let storage = SqliteStorage::new(make_config("unused.db"));
        assert_eq!(storage.name(), "sqlite");
        assert_eq!(storage.version(), semver::Version::new(0, 1, 0));
        assert_eq!(storage.adapter_type(), AdapterType::Storage);
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let (storage, _dir) = initialized().await;
        assert!(storage.initialize().await.is_err());
    }

    #[tokio::test]
    async fn operations_before_initialize_fail() {
        let storage = SqliteStorage::new(make_config("never-opened.db"));
        assert!(storage.read_turns("u1").await.is_err());
        assert!(matches!(
            storage.health_check().await.unwrap(),
            HealthStatus::Unhealthy(_)
        ));
    }

    #[tokio::test]
    async fn health_check_returns_healthy_when_initialized() {
        let (storage, _dir) = initialized().await;
        assert_eq!(storage.health_check().await.unwrap(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn delete_then_read_returns_empty() {
        let (storage, _dir) = initialized().await;
        storage.append_turn("u1", &turn("a")).await.unwrap();
        storage.append_turn("u1", &turn("b")).await.unwrap();
        assert_eq!(storage.delete_turns("u1").await.unwrap(), 2);
        assert!(storage.read_turns("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn read_all_histories_includes_paused_without_turns() {
        let (storage, _dir) = initialized().await;
        storage.append_turn("b", &turn("x")).await.unwrap();
        storage.append_turn("a", &turn("y")).await.unwrap();
        storage.set_paused("b", true).await.unwrap();
        storage.set_paused("c", true).await.unwrap();

        let states = storage.read_all_histories().await.unwrap();
        let summary: Vec<(&str, usize, bool)> = states
            .iter()
            .map(|s| (s.sender_id.as_str(), s.turns.len(), s.paused))
            .collect();
        assert_eq!(summary, [("a", 1, false), ("b", 1, true), ("c", 0, true)]);
    }

    #[tokio::test]
    async fn set_paused_reports_changes() {
        let (storage, _dir) = initialized().await;
        assert!(storage.set_paused("u1", true).await.unwrap());
        assert!(!storage.set_paused("u1", true).await.unwrap());
        assert!(storage.is_paused("u1").await.unwrap());
        assert!(storage.set_paused("u1", false).await.unwrap());
        assert!(!storage.set_paused("u1", false).await.unwrap());
        assert!(!storage.is_paused("u1").await.unwrap());
    }

    #[tokio::test]
    async fn close_and_shutdown_checkpoint() {
        let (storage, _dir) = initialized().await;
        storage.append_turn("u1", &turn("a")).await.unwrap();
        storage.close().await.unwrap();
        storage.shutdown().await.unwrap();
    }
}
