// SPDX-FileCopyrightText: 2026 Minwon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `minwon serve` command implementation.
//!
//! Wires SQLite storage, the Anthropic provider, the Kakao callback client
//! and the relay behind the HTTP gateway, then runs until SIGINT/SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use minwon_anthropic::AnthropicProvider;
use minwon_config::model::MinwonConfig;
use minwon_core::error::MinwonError;
use minwon_core::StorageAdapter;
use minwon_gateway::GatewayState;
use minwon_kakao::KakaoCallbackClient;
use minwon_relay::{
    CallbackDispatcher, ContextSettings, Relay, ReplyGenerator, UrgencyClassifier, UrgentNotifier,
    load_system_prompt, shutdown,
};
use minwon_storage::SqliteStorage;
use tracing::{error, info, warn};

/// Upper bound on waiting for in-flight callback jobs at shutdown.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs the `minwon serve` command.
pub async fn run_serve(config: MinwonConfig) -> Result<(), MinwonError> {
    init_tracing(&config.agent.log_level);

    info!(name = %config.agent.name, "starting minwon serve");

    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    let storage: Arc<dyn StorageAdapter> = Arc::new(storage);
    info!(path = %config.storage.database_path, "storage initialized");

    let provider = AnthropicProvider::new(&config.anthropic).map_err(|e| {
        error!(error = %e, "failed to initialize Anthropic provider");
        eprintln!("error: Anthropic API key required. Set anthropic.api_key or ANTHROPIC_API_KEY");
        e
    })?;
    let delivery = KakaoCallbackClient::new(&config.kakao)?;
    let notifier = UrgentNotifier::new(config.relay.owner_notify_url.clone())?;
    if !notifier.is_enabled() {
        info!("owner notification disabled (relay.owner_notify_url not set)");
    }
    if config.server.admin_token.is_none() {
        warn!("server.admin_token not set, admin API rejects all requests");
    }

    let system_prompt = load_system_prompt(&config.agent).await;
    let generator = ReplyGenerator::new(
        Arc::new(provider),
        Arc::clone(&storage),
        system_prompt,
        ContextSettings {
            model: config.anthropic.default_model.clone(),
            max_tokens: config.anthropic.max_tokens,
            history_turns: config.relay.history_turns,
        },
        UrgencyClassifier::from_config(&config.relay),
    );
    let dispatcher = CallbackDispatcher::new(Arc::new(delivery), config.relay.max_concurrent_jobs);
    let relay = Arc::new(Relay::new(
        config.relay.clone(),
        Arc::clone(&storage),
        generator,
        dispatcher.clone(),
        notifier,
    ));

    let state = GatewayState::new(relay, Arc::clone(&storage), &config);
    let cancel = shutdown::install_signal_handler();

    let served = minwon_gateway::serve(&config.server.host, config.server.port, state, cancel).await;
    if let Err(e) = &served {
        error!(error = %e, "http server failed");
    }

    if !dispatcher.shutdown(DRAIN_TIMEOUT).await {
        warn!("some deferred replies were not delivered before shutdown");
    }
    if let Err(e) = storage.close().await {
        warn!(error = %e, "storage close failed");
    }

    info!("minwon serve shutdown complete");
    served
}

/// Initialize the tracing subscriber with an env filter.
///
/// `RUST_LOG` wins over `agent.log_level`.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("minwon={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
