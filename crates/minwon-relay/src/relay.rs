// SPDX-FileCopyrightText: 2026 Minwon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The inbound message flow: prompt, suppress, defer, or reply.

use std::sync::Arc;
use std::time::Duration;

use minwon_config::model::RelayConfig;
use minwon_core::StorageAdapter;
use minwon_core::types::{ComplaintLogEntry, ComplaintStatus, ConversationTurn, InboundMessage};
use tracing::{error, info, warn};

use crate::dispatch::{CallbackDispatcher, JobHandle};
use crate::generate::{GeneratedReply, ReplyGenerator};
use crate::notify::{UrgentAlert, UrgentNotifier};

/// What the platform should be told about one inbound message.
#[derive(Debug)]
pub enum RelayOutcome {
    /// Empty utterance: ask for input. Nothing was recorded.
    Prompt(String),
    /// Sender is under human takeover: answer with nothing.
    Suppressed,
    /// A callback job was queued; acknowledge with `ack_text`.
    Deferred { ack_text: String, job: JobHandle },
    /// The reply was generated and recorded synchronously.
    Replied(GeneratedReply),
}

/// Routes inbound messages and records processed exchanges.
pub struct Relay {
    config: RelayConfig,
    storage: Arc<dyn StorageAdapter>,
    generator: ReplyGenerator,
    dispatcher: CallbackDispatcher,
    notifier: UrgentNotifier,
}

impl Relay {
    pub fn new(
        config: RelayConfig,
        storage: Arc<dyn StorageAdapter>,
        generator: ReplyGenerator,
        dispatcher: CallbackDispatcher,
        notifier: UrgentNotifier,
    ) -> Self {
        Self {
            config,
            storage,
            generator,
            dispatcher,
            notifier,
        }
    }

    pub fn dispatcher(&self) -> &CallbackDispatcher {
        &self.dispatcher
    }

    /// Handles one inbound message.
    ///
    /// For a paused sender this waits `paused_delay_secs` before returning, so
    /// the platform's synchronous window closes first.
    pub async fn handle(self: &Arc<Self>, msg: InboundMessage) -> RelayOutcome {
        if msg.text.trim().is_empty() {
            return RelayOutcome::Prompt(self.config.empty_prompt_text.clone());
        }

        if self.sender_paused(&msg.sender_id).await {
            info!(sender_id = %msg.sender_id, "sender paused, suppressing reply");
            tokio::time::sleep(Duration::from_secs(self.config.paused_delay_secs)).await;
            return RelayOutcome::Suppressed;
        }

        match msg.callback_url {
            Some(callback_url) => {
                let relay = Arc::clone(self);
                let sender_id = msg.sender_id.clone();
                let text = msg.text;
                let job = self.dispatcher.dispatch(&msg.sender_id, callback_url, async move {
                    relay.process(&sender_id, &text).await.to_outbound()
                });
                RelayOutcome::Deferred {
                    ack_text: self.config.wait_text.clone(),
                    job,
                }
            }
            None => RelayOutcome::Replied(self.process(&msg.sender_id, &msg.text).await),
        }
    }

    /// Generates (or falls back), records, and escalates one exchange.
    pub async fn process(&self, sender_id: &str, utterance: &str) -> GeneratedReply {
        let reply = match self.generator.generate(sender_id, utterance).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(sender_id, error = %e, "reply generation failed, using fallback");
                GeneratedReply::fallback(self.config.fallback_text.clone())
            }
        };

        self.record(sender_id, utterance, &reply).await;

        if reply.is_urgent {
            warn!(sender_id, message = utterance, "urgent complaint received");
            self.alert_owner(sender_id, utterance, &reply);
        }

        reply
    }

    /// Posts the owner alert in the background; shutdown drains it with the jobs.
    fn alert_owner(&self, sender_id: &str, utterance: &str, reply: &GeneratedReply) {
        if !self.notifier.is_enabled() {
            return;
        }
        let notifier = self.notifier.clone();
        let alert = UrgentAlert {
            sender_id: sender_id.to_string(),
            message: utterance.to_string(),
            reply: reply.text.clone(),
            timestamp: reply.timestamp.clone(),
        };
        self.dispatcher
            .spawn_background(async move { notifier.notify(&alert).await });
    }

    /// Appends the log entry and the history turn. Failures are logged only.
    async fn record(&self, sender_id: &str, utterance: &str, reply: &GeneratedReply) {
        let entry = ComplaintLogEntry {
            timestamp: reply.timestamp.clone(),
            sender_id: sender_id.to_string(),
            message: utterance.to_string(),
            reply: reply.text.clone(),
            is_urgent: reply.is_urgent,
            status: ComplaintStatus::from_urgency(reply.is_urgent),
        };
        if let Err(e) = self.storage.append_log_entry(&entry).await {
            error!(sender_id, error = %e, "failed to write complaint log entry");
        }

        let turn = ConversationTurn {
            user_message: utterance.to_string(),
            assistant_reply: reply.text.clone(),
            timestamp: reply.timestamp.clone(),
        };
        if let Err(e) = self.storage.append_turn(sender_id, &turn).await {
            error!(sender_id, error = %e, "failed to append conversation turn");
        }
    }

    /// A pause-flag read failure counts as not paused.
    async fn sender_paused(&self, sender_id: &str) -> bool {
        match self.storage.is_paused(sender_id).await {
            Ok(paused) => paused,
            Err(e) => {
                warn!(sender_id, error = %e, "pause flag read failed, treating as not paused");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextSettings;
    use crate::dispatch::JobStatus;
    use crate::urgency::UrgencyClassifier;
    use minwon_test_utils::{MockDelivery, MockProvider, temp_storage};

    struct Fixture {
        relay: Arc<Relay>,
        provider: Arc<MockProvider>,
        delivery: Arc<MockDelivery>,
        storage: Arc<dyn StorageAdapter>,
        _dir: tempfile::TempDir,
    }

    async fn fixture(provider: MockProvider) -> Fixture {
        fixture_with_notifier(provider, UrgentNotifier::disabled()).await
    }

    async fn fixture_with_notifier(provider: MockProvider, notifier: UrgentNotifier) -> Fixture {
        let (storage, dir) = temp_storage().await;
        let storage: Arc<dyn StorageAdapter> = storage;
        let provider = Arc::new(provider);
        let delivery = Arc::new(MockDelivery::new());
        let config = RelayConfig::default();
        let generator = ReplyGenerator::new(
            provider.clone(),
            Arc::clone(&storage),
            "sys".into(),
            ContextSettings {
                model: "m".into(),
                max_tokens: 500,
                history_turns: config.history_turns,
            },
            UrgencyClassifier::from_config(&config),
        );
        let relay = Arc::new(Relay::new(
            config,
            Arc::clone(&storage),
            generator,
            CallbackDispatcher::new(delivery.clone(), 4),
            notifier,
        ));
        Fixture {
            relay,
            provider,
            delivery,
            storage,
            _dir: dir,
        }
    }

    fn msg(sender: &str, text: &str, callback: Option<&str>) -> InboundMessage {
        InboundMessage {
            sender_id: sender.into(),
            text: text.into(),
            callback_url: callback.map(String::from),
        }
    }

    #[tokio::test]
    async fn empty_utterance_prompts_without_side_effects() {
        let f = fixture(MockProvider::with_replies(["unused"])).await;
        for text in ["", "   "] {
            match f.relay.handle(msg("u1", text, Some("http://cb"))).await {
                RelayOutcome::Prompt(t) => assert_eq!(t, "무엇을 도와드릴까요? 😊"),
                other => panic!("expected prompt, got {other:?}"),
            }
        }
        assert!(f.provider.requests().is_empty());
        assert!(f.storage.read_log(false).await.unwrap().is_empty());
        assert!(f.storage.read_turns("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn sync_reply_is_recorded_once() {
        let f = fixture(MockProvider::with_replies(["1층 보관함에 두세요"])).await;
        let outcome = f.relay.handle(msg("u1", "택배는요?", None)).await;
        let RelayOutcome::Replied(reply) = outcome else {
            panic!("expected reply");
        };
        assert_eq!(reply.text, "1층 보관함에 두세요");
        assert!(!reply.is_urgent);

        let log = f.storage.read_log(false).await.unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].status, ComplaintStatus::AutoHandled);
        assert_eq!(f.storage.read_turns("u1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn keyword_with_provider_failure_falls_back_not_urgent() {
        let f = fixture(MockProvider::failing("down")).await;
        let RelayOutcome::Replied(reply) = f.relay.handle(msg("u1", "누수", None)).await else {
            panic!("expected reply");
        };
        assert_eq!(reply.text, RelayConfig::default().fallback_text);
        assert!(!reply.is_urgent);

        let log = f.storage.read_log(false).await.unwrap();
        assert_eq!(log.len(), 1);
        assert!(!log[0].is_urgent);
        assert!(f.storage.read_log(true).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn keyword_with_provider_success_is_urgent() {
        let f = fixture(MockProvider::with_replies(["곧 확인하겠습니다."])).await;
        let RelayOutcome::Replied(reply) = f.relay.handle(msg("u1", "누수", None)).await else {
            panic!("expected reply");
        };
        assert!(reply.is_urgent);
        let urgent = f.storage.read_log(true).await.unwrap();
        assert_eq!(urgent.len(), 1);
        assert_eq!(urgent[0].status, ComplaintStatus::Received);
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn urgent_exchange_emits_warning() {
        let f = fixture(MockProvider::with_replies(["바로 확인하겠습니다."])).await;
        f.relay.handle(msg("u7", "화재 경보가 울려요", None)).await;
        assert!(logs_contain("urgent complaint received"));
    }

    #[tokio::test(start_paused = true)]
    async fn paused_sender_is_suppressed_after_delay() {
        let f = fixture(MockProvider::with_replies(["unused"])).await;
        f.storage.set_paused("u1", true).await.unwrap();

        let started = tokio::time::Instant::now();
        let outcome = f.relay.handle(msg("u1", "안녕하세요", Some("http://cb"))).await;
        assert!(matches!(outcome, RelayOutcome::Suppressed));
        assert!(started.elapsed() >= Duration::from_secs(6));

        assert!(f.provider.requests().is_empty());
        assert!(f.delivery.deliveries().is_empty());
        assert!(f.storage.read_log(false).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn callback_path_acknowledges_then_delivers() {
        let f = fixture(MockProvider::with_replies(["보일러 리셋 버튼을 눌러주세요."])).await;
        let outcome = f
            .relay
            .handle(msg("u1", "보일러가 안 돼요", Some("http://cb/1")))
            .await;
        let RelayOutcome::Deferred { ack_text, mut job } = outcome else {
            panic!("expected deferred");
        };
        assert_eq!(ack_text, RelayConfig::default().wait_text);
        assert_eq!(job.wait().await, JobStatus::Delivered);

        let delivered = f.delivery.deliveries();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].0, "http://cb/1");
        assert_eq!(delivered[0].1.text, "보일러 리셋 버튼을 눌러주세요.");
        assert_eq!(f.storage.read_turns("u1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn slow_owner_alert_does_not_hold_the_reply() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let owner = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/alert"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(1500)))
            .expect(1)
            .mount(&owner)
            .await;
        let notifier = UrgentNotifier::new(Some(format!("{}/alert", owner.uri()))).unwrap();
        let f = fixture_with_notifier(MockProvider::with_replies(["바로 가겠습니다."]), notifier).await;

        let started = std::time::Instant::now();
        let reply = f.relay.process("u1", "가스 냄새가 나요").await;
        assert!(reply.is_urgent);
        assert!(started.elapsed() < Duration::from_millis(1000));

        assert!(f.relay.dispatcher().shutdown(Duration::from_secs(5)).await);
        let received = owner.received_requests().await.unwrap_or_default();
        assert_eq!(received.len(), 1);
        let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
        assert_eq!(body["sender_id"], "u1");
    }
}
