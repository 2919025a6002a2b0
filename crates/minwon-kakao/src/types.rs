// SPDX-FileCopyrightText: 2026 Minwon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Kakao i Open Builder skill payload types.
//!
//! Only the fields the relay reads are modelled on the request side; every
//! other field in the envelope is ignored.

use minwon_core::types::InboundMessage;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

/// Sender id used when the envelope carries none.
pub const UNKNOWN_SENDER: &str = "unknown";

/// Response schema version sent with every skill response.
pub const SKILL_VERSION: &str = "2.0";

// --- Request ---

/// Inbound skill request envelope.
///
/// Each field is read on its own: a field of the wrong JSON type falls back
/// to its default without discarding the rest of the envelope.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillRequest {
    #[serde(default, deserialize_with = "or_default")]
    pub user_request: UserRequest,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest {
    #[serde(default, deserialize_with = "text_or_empty")]
    pub utterance: String,
    #[serde(default, deserialize_with = "or_default")]
    pub user: SkillUser,
    /// One-time deferred-callback address, present only when the block has
    /// callbacks enabled.
    #[serde(default, deserialize_with = "text_or_none")]
    pub callback_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SkillUser {
    /// Numeric ids are kept in their decimal form.
    #[serde(default = "unknown_sender", deserialize_with = "sender_id")]
    pub id: String,
}

impl Default for SkillUser {
    fn default() -> Self {
        Self {
            id: unknown_sender(),
        }
    }
}

fn unknown_sender() -> String {
    UNKNOWN_SENDER.to_string()
}

fn or_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(de)?;
    Ok(T::deserialize(value).unwrap_or_else(|e| {
        debug!(error = %e, "skill request field has unexpected shape, using default");
        T::default()
    }))
}

fn text_or_empty<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::String(text) => text,
        _ => String::new(),
    })
}

fn text_or_none<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::String(text) => Some(text),
        _ => None,
    })
}

fn sender_id<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::String(id) => id,
        Value::Number(id) => id.to_string(),
        _ => unknown_sender(),
    })
}

impl SkillRequest {
    /// Parses a request body; a body that is not a JSON object is an empty envelope.
    pub fn from_slice_lenient(body: &[u8]) -> Self {
        match serde_json::from_slice(body) {
            Ok(request) => request,
            Err(e) => {
                debug!(error = %e, "malformed skill request, using empty envelope");
                Self::default()
            }
        }
    }

    /// Strips the platform envelope.
    pub fn into_inbound(self) -> InboundMessage {
        let user_request = self.user_request;
        InboundMessage {
            sender_id: user_request.user.id,
            text: user_request.utterance,
            callback_url: user_request.callback_url.filter(|url| !url.is_empty()),
        }
    }
}

// --- Response ---

/// Skill response body.
///
/// A regular reply carries `template`; a deferred-callback acknowledgment
/// carries `useCallback` and `data` instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillResponse {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<SkillTemplate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_callback: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<CallbackData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillTemplate {
    pub outputs: Vec<SkillOutput>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quick_replies: Vec<QuickReply>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillOutput {
    pub simple_text: SimpleText,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleText {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickReply {
    pub message_text: String,
    pub action: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackData {
    pub text: String,
}

impl SkillResponse {
    /// Text of the first simple-text output, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.template
            .as_ref()
            .and_then(|t| t.outputs.first())
            .map(|o| o.simple_text.text.as_str())
    }
}
