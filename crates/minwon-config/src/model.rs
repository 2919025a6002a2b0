// SPDX-FileCopyrightText: 2026 Minwon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Minwon chat relay.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Minwon configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MinwonConfig {
    /// Assistant identity and prompt settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Anthropic API settings.
    #[serde(default)]
    pub anthropic: AnthropicConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// HTTP listener and admin access settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Relay behavior: history window, pause delay, urgency rule, fixed texts.
    #[serde(default)]
    pub relay: RelayConfig,

    /// Kakao skill response and callback settings.
    #[serde(default)]
    pub kakao: KakaoConfig,
}

/// Assistant identity and prompt configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name used in logs and the health payload.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Inline system prompt string. Overridden by `system_prompt_file` if both set.
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Path to a file containing the system prompt.
    /// Takes precedence over `system_prompt` if both are set.
    #[serde(default)]
    pub system_prompt_file: Option<String>,

    /// Building facts appended to the system prompt.
    #[serde(default)]
    pub building_info: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            system_prompt: None,
            system_prompt_file: None,
            building_info: None,
        }
    }
}

fn default_agent_name() -> String {
    "minwon".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Anthropic API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnthropicConfig {
    /// Anthropic API key. `None` falls back to `ANTHROPIC_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model used for every completion request.
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Maximum tokens to generate per response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Anthropic API version string.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Base URL of the Messages API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_anthropic_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_model: default_model(),
            max_tokens: default_max_tokens(),
            api_version: default_api_version(),
            base_url: default_base_url(),
            timeout_secs: default_anthropic_timeout_secs(),
        }
    }
}

fn default_model() -> String {
    "claude-haiku-4-5-20251001".to_string()
}

fn default_max_tokens() -> u32 {
    500
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

fn default_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_anthropic_timeout_secs() -> u64 {
    30
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("minwon").join("minwon.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("minwon.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind the HTTP server to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bearer token for `/admin/*`. Admin routes reject every request when unset.
    #[serde(default)]
    pub admin_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            admin_token: None,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Relay behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    /// Most recent prior turns included in the completion context.
    #[serde(default = "default_history_turns")]
    pub history_turns: usize,

    /// Seconds a paused sender's request is held before the silent response.
    #[serde(default = "default_paused_delay_secs")]
    pub paused_delay_secs: u64,

    /// Upper bound on concurrently running deferred-callback jobs.
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,

    /// Literal tag in a reply that marks it urgent.
    #[serde(default = "default_urgent_marker")]
    pub urgent_marker: String,

    /// Utterance substrings that mark a request urgent.
    #[serde(default = "default_urgent_keywords")]
    pub urgent_keywords: Vec<String>,

    /// Reply sent when generation fails.
    #[serde(default = "default_fallback_text")]
    pub fallback_text: String,

    /// Reply to an empty utterance.
    #[serde(default = "default_empty_prompt_text")]
    pub empty_prompt_text: String,

    /// Acknowledgment text returned with a deferred-callback response.
    #[serde(default = "default_wait_text")]
    pub wait_text: String,

    /// Endpoint that receives a JSON alert for each urgent request.
    #[serde(default)]
    pub owner_notify_url: Option<String>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            history_turns: default_history_turns(),
            paused_delay_secs: default_paused_delay_secs(),
            max_concurrent_jobs: default_max_concurrent_jobs(),
            urgent_marker: default_urgent_marker(),
            urgent_keywords: default_urgent_keywords(),
            fallback_text: default_fallback_text(),
            empty_prompt_text: default_empty_prompt_text(),
            wait_text: default_wait_text(),
            owner_notify_url: None,
        }
    }
}

fn default_history_turns() -> usize {
    5
}

fn default_paused_delay_secs() -> u64 {
    6
}

fn default_max_concurrent_jobs() -> usize {
    16
}

fn default_urgent_marker() -> String {
    "[긴급]".to_string()
}

fn default_urgent_keywords() -> Vec<String> {
    ["누수", "물이 새", "침수", "화재", "불이", "연기", "가스", "정전"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_fallback_text() -> String {
    "죄송합니다, 일시적인 오류가 발생했습니다. 😅\n긴급한 문의는 임대인에게 직접 연락해 주세요."
        .to_string()
}

fn default_empty_prompt_text() -> String {
    "무엇을 도와드릴까요? 😊".to_string()
}

fn default_wait_text() -> String {
    "답변을 준비하고 있어요. 잠시만 기다려 주세요! ⏳".to_string()
}

/// Kakao skill response and callback configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KakaoConfig {
    /// Timeout in seconds for the POST to a deferred-callback address.
    #[serde(default = "default_callback_timeout_secs")]
    pub callback_timeout_secs: u64,

    /// Reply text is truncated to this many characters.
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,

    /// Text served by `/skill/info`.
    #[serde(default = "default_info_text")]
    pub info_text: String,

    /// Text served by `/skill/emergency`.
    #[serde(default = "default_emergency_text")]
    pub emergency_text: String,

    /// Quick-reply buttons attached to every simple-text response.
    #[serde(default = "default_quick_replies")]
    pub quick_replies: Vec<QuickReplyConfig>,
}

impl Default for KakaoConfig {
    fn default() -> Self {
        Self {
            callback_timeout_secs: default_callback_timeout_secs(),
            max_text_chars: default_max_text_chars(),
            info_text: default_info_text(),
            emergency_text: default_emergency_text(),
            quick_replies: default_quick_replies(),
        }
    }
}

/// One quick-reply button.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QuickReplyConfig {
    /// Button label shown to the user.
    pub label: String,
    /// Utterance sent back when the button is tapped.
    pub message_text: String,
}

impl QuickReplyConfig {
    fn new(label: &str, message_text: &str) -> Self {
        Self {
            label: label.to_string(),
            message_text: message_text.to_string(),
        }
    }
}

fn default_callback_timeout_secs() -> u64 {
    10
}

fn default_max_text_chars() -> usize {
    1000
}

fn default_info_text() -> String {
    "🏠 건물 관리 도우미입니다.\n\n💬 궁금한 점은 편하게 물어보세요! 😊".to_string()
}

fn default_emergency_text() -> String {
    "🚨 긴급 연락처\n\n🔥 화재/응급: 119\n🚔 범죄/소음: 112\n💧 수도 긴급: 120\n⛽ 가스 긴급: 1588-5788"
        .to_string()
}

fn default_quick_replies() -> Vec<QuickReplyConfig> {
    vec![
        QuickReplyConfig::new("🚨 긴급연락처", "긴급 연락처"),
        QuickReplyConfig::new("🏠 건물안내", "건물 안내"),
        QuickReplyConfig::new("🔧 보일러", "보일러 문제"),
        QuickReplyConfig::new("💧 수도", "수도 문제"),
    ]
}
