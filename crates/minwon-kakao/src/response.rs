// SPDX-FileCopyrightText: 2026 Minwon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builders for the three skill response shapes the relay sends.

use minwon_config::model::KakaoConfig;

use crate::types::{
    CallbackData, QuickReply, SKILL_VERSION, SimpleText, SkillOutput, SkillResponse,
    SkillTemplate,
};

const ELLIPSIS: char = '…';

/// Builds skill responses with the configured quick replies and text limit.
#[derive(Debug, Clone)]
pub struct ResponseBuilder {
    quick_replies: Vec<QuickReply>,
    max_text_chars: usize,
}

impl ResponseBuilder {
    pub fn new(config: &KakaoConfig) -> Self {
        Self {
            quick_replies: config
                .quick_replies
                .iter()
                .map(|q| QuickReply {
                    message_text: q.message_text.clone(),
                    action: "message".to_string(),
                    label: q.label.clone(),
                })
                .collect(),
            max_text_chars: config.max_text_chars,
        }
    }

    /// A single simple-text output followed by the quick-reply buttons.
    pub fn simple_text(&self, text: &str) -> SkillResponse {
        SkillResponse {
            version: SKILL_VERSION.to_string(),
            template: Some(SkillTemplate {
                outputs: vec![SkillOutput {
                    simple_text: SimpleText {
                        text: truncate_chars(text, self.max_text_chars),
                    },
                }],
                quick_replies: self.quick_replies.clone(),
            }),
            use_callback: None,
            data: None,
        }
    }

    /// Acknowledgment telling the platform the real answer arrives via callback.
    pub fn callback_ack(&self, text: &str) -> SkillResponse {
        SkillResponse {
            version: SKILL_VERSION.to_string(),
            template: None,
            use_callback: Some(true),
            data: Some(CallbackData {
                text: text.to_string(),
            }),
        }
    }

    /// A template with no outputs; the platform shows the user nothing.
    pub fn silent(&self) -> SkillResponse {
        SkillResponse {
            version: SKILL_VERSION.to_string(),
            template: Some(SkillTemplate {
                outputs: Vec::new(),
                quick_replies: Vec::new(),
            }),
            use_callback: None,
            data: None,
        }
    }
}

/// Truncates to at most `max` characters, marking the cut with an ellipsis.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(max - 1).collect();
    out.push(ELLIPSIS);
    out
}
