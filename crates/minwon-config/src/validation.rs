// SPDX-FileCopyrightText: 2026 Minwon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints serde attributes cannot express. All errors
//! are collected; validation does not stop at the first failure.

use crate::diagnostic::{ConfigError, RelayRule};
use crate::model::{MinwonConfig, RelayConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
pub fn validate_config(config: &MinwonConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |key: &str, reason: String| errors.push(ConfigError::invalid(key, reason));

    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        fail(
            "agent.log_level",
            format!(
                "is `{}`, expected one of {}",
                config.agent.log_level,
                LOG_LEVELS.join(", ")
            ),
        );
    }

    let host = config.server.host.trim();
    if host.is_empty() {
        fail("server.host", "must not be empty".to_string());
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            fail(
                "server.host",
                format!("`{host}` is not a valid IP address or hostname"),
            );
        }
    }

    if let Some(token) = &config.server.admin_token
        && token.trim().is_empty()
    {
        fail("server.admin_token", "must not be blank when set".to_string());
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path", "must not be empty".to_string());
    }

    if config.anthropic.max_tokens == 0 {
        fail("anthropic.max_tokens", "must be greater than 0".to_string());
    }
    if config.anthropic.timeout_secs == 0 {
        fail("anthropic.timeout_secs", "must be greater than 0".to_string());
    }
    if !is_http_url(&config.anthropic.base_url) {
        fail(
            "anthropic.base_url",
            format!("`{}` must start with http:// or https://", config.anthropic.base_url),
        );
    }

    if config.kakao.callback_timeout_secs == 0 {
        fail("kakao.callback_timeout_secs", "must be greater than 0".to_string());
    }
    if config.kakao.max_text_chars == 0 {
        fail("kakao.max_text_chars", "must be greater than 0".to_string());
    }
    for (i, reply) in config.kakao.quick_replies.iter().enumerate() {
        if reply.label.trim().is_empty() || reply.message_text.trim().is_empty() {
            fail(
                &format!("kakao.quick_replies[{i}]"),
                "needs a non-empty label and message_text".to_string(),
            );
        }
    }

    errors.extend(relay_rules(&config.relay));

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn relay_rules(relay: &RelayConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();
    if relay.max_concurrent_jobs == 0 {
        errors.push(ConfigError::relay(RelayRule::MaxConcurrentJobs, "must be at least 1"));
    }
    if relay.urgent_marker.trim().is_empty() {
        errors.push(ConfigError::relay(RelayRule::UrgentMarker, "must not be empty"));
    }
    if relay.urgent_keywords.iter().any(|k| k.trim().is_empty()) {
        errors.push(ConfigError::relay(
            RelayRule::UrgentKeywords,
            "must not contain empty strings",
        ));
    }
    if let Some(url) = &relay.owner_notify_url
        && !is_http_url(url)
    {
        errors.push(ConfigError::relay(
            RelayRule::OwnerNotifyUrl,
            format!("`{url}` must start with http:// or https://"),
        ));
    }
    errors
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}
