// SPDX-FileCopyrightText: 2026 Minwon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end relay testing.
//!
//! `TestHarness` assembles a complete relay with mock adapters and a temp
//! SQLite database. `send()` drives one inbound message through it.

use std::sync::Arc;

use minwon_config::model::{MinwonConfig, RelayConfig};
use minwon_core::types::InboundMessage;
use minwon_core::{MinwonError, StorageAdapter};
use minwon_relay::{
    CallbackDispatcher, ContextSettings, Relay, RelayOutcome, ReplyGenerator, UrgencyClassifier,
    UrgentNotifier,
};
use minwon_storage::SqliteStorage;

use crate::mock_delivery::MockDelivery;
use crate::mock_provider::MockProvider;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    provider: MockProvider,
    delivery: MockDelivery,
    relay: RelayConfig,
    system_prompt: String,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            provider: MockProvider::new(),
            delivery: MockDelivery::new(),
            relay: RelayConfig::default(),
            system_prompt: "You are a test assistant.".to_string(),
        }
    }

    /// Queue provider replies.
    pub fn with_replies<I, S>(mut self, replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.provider = MockProvider::with_replies(replies);
        self
    }

    /// Make every provider call fail.
    pub fn with_failing_provider(mut self) -> Self {
        self.provider = MockProvider::failing("mock provider failure");
        self
    }

    /// Make every callback delivery fail.
    pub fn with_failing_delivery(mut self) -> Self {
        self.delivery = MockDelivery::failing();
        self
    }

    /// Override the relay settings (pause delay, history cap, texts).
    pub fn with_relay_config(mut self, relay: RelayConfig) -> Self {
        self.relay = relay;
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, MinwonError> {
        let temp_dir = tempfile::TempDir::new().map_err(MinwonError::storage)?;
        let mut config = MinwonConfig::default();
        config.storage.database_path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .into_owned();
        config.relay = self.relay;

        let storage = SqliteStorage::new(config.storage.clone());
        storage.initialize().await?;
        let storage: Arc<dyn StorageAdapter> = Arc::new(storage);

        let provider = Arc::new(self.provider);
        let delivery = Arc::new(self.delivery);

        let generator = ReplyGenerator::new(
            provider.clone(),
            Arc::clone(&storage),
            self.system_prompt,
            ContextSettings {
                model: config.anthropic.default_model.clone(),
                max_tokens: config.anthropic.max_tokens,
                history_turns: config.relay.history_turns,
            },
            UrgencyClassifier::from_config(&config.relay),
        );
        let dispatcher = CallbackDispatcher::new(delivery.clone(), config.relay.max_concurrent_jobs);
        let relay = Arc::new(Relay::new(
            config.relay.clone(),
            Arc::clone(&storage),
            generator,
            dispatcher,
            UrgentNotifier::disabled(),
        ));

        Ok(TestHarness {
            relay,
            provider,
            delivery,
            storage,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete relay with mock adapters and temp storage.
pub struct TestHarness {
    pub relay: Arc<Relay>,
    /// The mock completion provider.
    pub provider: Arc<MockProvider>,
    /// The mock callback delivery target.
    pub delivery: Arc<MockDelivery>,
    /// SQLite storage adapter (temp DB, cleaned up on drop).
    pub storage: Arc<dyn StorageAdapter>,
    pub config: MinwonConfig,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Sends a message without a callback address.
    pub async fn send(&self, sender_id: &str, text: &str) -> RelayOutcome {
        self.relay.handle(inbound(sender_id, text, None)).await
    }

    /// Sends a message carrying a deferred-callback address.
    pub async fn send_with_callback(
        &self,
        sender_id: &str,
        text: &str,
        callback_url: &str,
    ) -> RelayOutcome {
        self.relay
            .handle(inbound(sender_id, text, Some(callback_url.to_string())))
            .await
    }
}

fn inbound(sender_id: &str, text: &str, callback_url: Option<String>) -> InboundMessage {
    InboundMessage {
        sender_id: sender_id.to_string(),
        text: text.to_string(),
        callback_url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builder_creates_working_environment() {
        let harness = TestHarness::builder().build().await.unwrap();
        assert!(harness.storage.read_log(false).await.unwrap().is_empty());
        assert!(harness.storage.list_paused().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn send_returns_mock_reply_and_persists() {
        let harness = TestHarness::builder()
            .with_replies(["test output"])
            .build()
            .await
            .unwrap();

        let RelayOutcome::Replied(reply) = harness.send("u1", "hello").await else {
            panic!("expected a synchronous reply");
        };
        assert_eq!(reply.text, "test output");

        let turns = harness.storage.read_turns("u1").await.unwrap();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].user_message, "hello");
        assert_eq!(turns[0].assistant_reply, "test output");
    }

    #[tokio::test]
    async fn temp_db_is_unique_per_harness() {
        let h1 = TestHarness::builder().build().await.unwrap();
        let h2 = TestHarness::builder().build().await.unwrap();

        h1.send("u1", "msg1").await;
        assert_eq!(h1.storage.read_log(false).await.unwrap().len(), 1);
        assert!(h2.storage.read_log(false).await.unwrap().is_empty());
    }
}
