// SPDX-FileCopyrightText: 2026 Minwon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Context assembly for completion requests.
//!
//! Loads the system prompt from config and builds the message list from a
//! sender's most recent turns plus the new utterance.

use minwon_config::model::AgentConfig;
use minwon_core::types::{ConversationTurn, ProviderMessage, ProviderRequest};
use tracing::{info, warn};

/// Prompt used when neither a prompt file nor an inline prompt is configured.
pub const DEFAULT_SYSTEM_PROMPT: &str = "당신은 건물 관리 AI 도우미입니다.
입주민의 민원과 질문에 친절하고 실용적으로 답변합니다.

## 답변 규칙
1. 짧고 명확하게 답변 (카카오톡 메시지이므로 간결하게, 최대 300자)
2. 이모지를 적절히 활용
3. 자가 해결 가능하면 단계별 안내
4. 긴급 상황이면 [긴급] 태그를 붙이고 임대인 연락 안내
5. 등록된 정보가 없는 내용은 임대인에게 문의하라고 안내
6. 존댓말 사용

## 긴급 상황 판단 기준
다음 키워드가 포함되면 긴급으로 분류:
- 누수, 물이 새, 침수, 화재, 불, 연기, 가스 냄새, 가스 누출
- 정전, 문 안 열림, 잠김, 도둑, 침입";

const BUILDING_INFO_HEADING: &str = "## 건물 정보";

/// Loads the system prompt: file > inline > default, then appends building info.
pub async fn load_system_prompt(config: &AgentConfig) -> String {
    let base = read_prompt_file(config.system_prompt_file.as_deref())
        .await
        .or_else(|| config.system_prompt.clone().filter(|p| !p.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

    match config.building_info.as_deref().map(str::trim) {
        Some(info) if !info.is_empty() => format!("{base}\n\n{BUILDING_INFO_HEADING}\n{info}"),
        _ => base,
    }
}

async fn read_prompt_file(path: Option<&str>) -> Option<String> {
    let path = path?;
    match tokio::fs::read_to_string(path).await {
        Ok(content) => {
            let trimmed = content.trim();
            if trimmed.is_empty() {
                warn!(path, "system prompt file is empty, falling back");
                None
            } else {
                info!(path, "loaded system prompt from file");
                Some(trimmed.to_string())
            }
        }
        Err(e) => {
            warn!(path, error = %e, "failed to read system prompt file, falling back");
            None
        }
    }
}

/// Model parameters and window size for one completion request.
#[derive(Debug, Clone)]
pub struct ContextSettings {
    pub model: String,
    pub max_tokens: u32,
    /// Maximum prior turns included.
    pub history_turns: usize,
}

/// Builds a [`ProviderRequest`] from prior turns and the new utterance.
///
/// Only the last `settings.history_turns` turns are used. Each turn becomes a
/// user message and an assistant message, oldest first, and the utterance is
/// the final user message.
pub fn build_request(
    history: &[ConversationTurn],
    utterance: &str,
    system_prompt: &str,
    settings: &ContextSettings,
) -> ProviderRequest {
    let start = history.len().saturating_sub(settings.history_turns);
    let window = &history[start..];

    let mut messages = Vec::with_capacity(window.len() * 2 + 1);
    for turn in window {
        messages.push(ProviderMessage::user(turn.user_message.clone()));
        messages.push(ProviderMessage::assistant(turn.assistant_reply.clone()));
    }
    messages.push(ProviderMessage::user(utterance));

    ProviderRequest {
        model: settings.model.clone(),
        system_prompt: Some(system_prompt.to_string()),
        messages,
        max_tokens: settings.max_tokens,
    }
}
