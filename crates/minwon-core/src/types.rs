// SPDX-FileCopyrightText: 2026 Minwon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across adapter traits and the relay.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

impl HealthStatus {
    /// Short label used in health endpoint payloads.
    pub fn label(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded(_) => "degraded",
            HealthStatus::Unhealthy(_) => "unhealthy",
        }
    }
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Provider,
    Storage,
    Delivery,
}

// --- Inbound ---

/// A message received from the messaging platform, already stripped of
/// platform envelope details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Platform identifier of the end user.
    pub sender_id: String,
    /// Free-text utterance. May be empty.
    pub text: String,
    /// One-time deferred-callback address, when the platform granted one.
    pub callback_url: Option<String>,
}

// --- History & log ---

/// One recorded exchange between a sender and the assistant.
///
/// Immutable once stored. Ordered by append order within a sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub user_message: String,
    pub assistant_reply: String,
    /// RFC 3339 timestamp of when the turn was recorded.
    pub timestamp: String,
}

/// A sender's full state as seen by operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserState {
    pub sender_id: String,
    pub turns: Vec<ConversationTurn>,
    pub paused: bool,
}

/// Processing status recorded alongside a complaint log entry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ComplaintStatus {
    /// Urgent: waiting for an operator to pick it up.
    Received,
    /// Answered by the assistant alone.
    AutoHandled,
}

impl ComplaintStatus {
    /// Status derived from the urgency flag.
    pub fn from_urgency(is_urgent: bool) -> Self {
        if is_urgent {
            ComplaintStatus::Received
        } else {
            ComplaintStatus::AutoHandled
        }
    }
}

/// Write-once record of a processed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintLogEntry {
    pub timestamp: String,
    pub sender_id: String,
    pub message: String,
    pub reply: String,
    pub is_urgent: bool,
    pub status: ComplaintStatus,
}

/// Membership record in the pause set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PausedSender {
    pub sender_id: String,
    pub paused_at: String,
}

// --- Provider ---

/// A single message in a completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderMessage {
    /// "user" or "assistant".
    pub role: String,
    pub content: String,
}

impl ProviderMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// A provider-agnostic completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderRequest {
    pub model: String,
    pub system_prompt: Option<String>,
    pub messages: Vec<ProviderMessage>,
    pub max_tokens: u32,
}

/// Token accounting reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// A provider-agnostic completion response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderResponse {
    pub id: String,
    pub content: String,
    pub model: String,
    pub stop_reason: Option<String>,
    pub usage: TokenUsage,
}

// --- Outbound ---

/// Reply text handed to a delivery adapter for a deferred callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundReply {
    pub text: String,
    pub is_urgent: bool,
}
