// SPDX-FileCopyrightText: 2026 Minwon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword-based urgency rule.

use minwon_config::model::RelayConfig;

/// Flags a request urgent when the reply carries the marker or the
/// utterance contains any keyword. Matching is case-sensitive substring.
///
/// The result is a routing hint for operators, not a safety judgment.
#[derive(Debug, Clone)]
pub struct UrgencyClassifier {
    marker: String,
    keywords: Vec<String>,
}

impl UrgencyClassifier {
    pub fn new(marker: impl Into<String>, keywords: Vec<String>) -> Self {
        Self {
            marker: marker.into(),
            keywords,
        }
    }

    pub fn from_config(config: &RelayConfig) -> Self {
        Self::new(config.urgent_marker.clone(), config.urgent_keywords.clone())
    }

    /// True when the utterance contains a configured keyword.
    pub fn utterance_matches(&self, utterance: &str) -> bool {
        self.keywords
            .iter()
            .any(|k| !k.is_empty() && utterance.contains(k.as_str()))
    }

    /// True when the reply carries the urgent marker.
    pub fn reply_marked(&self, reply: &str) -> bool {
        !self.marker.is_empty() && reply.contains(self.marker.as_str())
    }

    pub fn classify(&self, utterance: &str, reply: &str) -> bool {
        self.reply_marked(reply) || self.utterance_matches(utterance)
    }
}
