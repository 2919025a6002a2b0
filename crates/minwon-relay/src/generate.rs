// SPDX-FileCopyrightText: 2026 Minwon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply generation against the completion provider.

use std::sync::Arc;

use minwon_core::error::MinwonError;
use minwon_core::types::OutboundReply;
use minwon_core::{ProviderAdapter, StorageAdapter};
use tracing::{debug, warn};

use crate::context::{ContextSettings, build_request};
use crate::urgency::UrgencyClassifier;

/// A reply ready to be returned, persisted, and delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedReply {
    pub text: String,
    pub is_urgent: bool,
    pub timestamp: String,
}

impl GeneratedReply {
    /// The reply used when generation failed.
    ///
    /// Never urgent, even when the utterance matched a keyword.
    pub fn fallback(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_urgent: false,
            timestamp: minwon_core::now_rfc3339(),
        }
    }

    pub fn to_outbound(&self) -> OutboundReply {
        OutboundReply {
            text: self.text.clone(),
            is_urgent: self.is_urgent,
        }
    }
}

/// Produces replies from a sender's recent history and a new utterance.
pub struct ReplyGenerator {
    provider: Arc<dyn ProviderAdapter>,
    storage: Arc<dyn StorageAdapter>,
    system_prompt: String,
    settings: ContextSettings,
    urgency: UrgencyClassifier,
}

impl ReplyGenerator {
    pub fn new(
        provider: Arc<dyn ProviderAdapter>,
        storage: Arc<dyn StorageAdapter>,
        system_prompt: String,
        settings: ContextSettings,
        urgency: UrgencyClassifier,
    ) -> Self {
        Self {
            provider,
            storage,
            system_prompt,
            settings,
            urgency,
        }
    }

    /// Generates a reply. Any provider failure is returned to the caller,
    /// which decides what the user sees instead.
    ///
    /// A history read failure degrades to an empty context.
    pub async fn generate(
        &self,
        sender_id: &str,
        utterance: &str,
    ) -> Result<GeneratedReply, MinwonError> {
        let history = match self
            .storage
            .recent_turns(sender_id, self.settings.history_turns)
            .await
        {
            Ok(turns) => turns,
            Err(e) => {
                warn!(sender_id, error = %e, "history read failed, generating without context");
                Vec::new()
            }
        };

        let request = build_request(&history, utterance, &self.system_prompt, &self.settings);
        debug!(
            sender_id,
            prior_turns = history.len(),
            messages = request.messages.len(),
            "requesting completion"
        );

        let response = self.provider.complete(request).await?;
        debug!(
            sender_id,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "completion received"
        );

        let is_urgent = self.urgency.classify(utterance, &response.content);
        Ok(GeneratedReply {
            text: response.content,
            is_urgent,
            timestamp: minwon_core::now_rfc3339(),
        })
    }
}
