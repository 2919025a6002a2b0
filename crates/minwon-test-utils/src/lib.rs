// SPDX-FileCopyrightText: 2026 Minwon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Minwon integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockProvider`] - Mock completion provider with queued replies or a fixed failure
//! - [`MockDelivery`] - Mock callback delivery that captures outbound replies
//! - [`TestHarness`] - A full relay over a temp SQLite database
//! - [`temp_storage`] - An initialized SQLite store in a temp directory

pub mod harness;
pub mod mock_delivery;
pub mod mock_provider;

use std::sync::Arc;

use minwon_config::model::StorageConfig;
use minwon_core::StorageAdapter;
use minwon_storage::SqliteStorage;

pub use harness::TestHarness;
pub use mock_delivery::MockDelivery;
pub use mock_provider::MockProvider;

/// Opens a fresh SQLite store in a temp directory.
///
/// The directory is removed when the returned guard is dropped.
pub async fn temp_storage() -> (Arc<dyn StorageAdapter>, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let storage = SqliteStorage::new(StorageConfig {
        database_path: dir.path().join("test.db").to_string_lossy().into_owned(),
        wal_mode: true,
    });
    storage.initialize().await.expect("initialize temp storage");
    (Arc::new(storage), dir)
}
