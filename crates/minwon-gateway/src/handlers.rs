// SPDX-FileCopyrightText: 2026 Minwon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Skill webhook and health handlers.
//!
//! Handles POST /skill/complaint, /skill/info, /skill/emergency and GET /health.

use axum::{Json, body::Bytes, extract::State};
use serde::Serialize;

use minwon_core::PluginAdapter;
use minwon_core::types::HealthStatus;
use minwon_kakao::{SkillRequest, SkillResponse};
use minwon_relay::RelayOutcome;

use crate::server::GatewayState;

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "ok" while the process serves requests.
    pub status: String,
    /// Binary version.
    pub version: String,
    pub uptime_secs: u64,
    /// RFC 3339 time of the check.
    pub timestamp: String,
    /// Storage adapter health label.
    pub storage: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_detail: Option<String>,
}

/// POST /skill/complaint
///
/// The body is parsed leniently: anything that is not a skill envelope is
/// handled as an empty utterance from an unknown sender.
pub async fn post_complaint(State(state): State<GatewayState>, body: Bytes) -> Json<SkillResponse> {
    let inbound = SkillRequest::from_slice_lenient(&body).into_inbound();
    tracing::debug!(
        sender_id = %inbound.sender_id,
        has_callback = inbound.callback_url.is_some(),
        "skill request received"
    );

    let response = match state.relay.handle(inbound).await {
        RelayOutcome::Prompt(text) => state.responses.simple_text(&text),
        RelayOutcome::Suppressed => state.responses.silent(),
        RelayOutcome::Deferred { ack_text, job } => {
            tracing::debug!(job_id = %job.id(), "deferred reply queued");
            state.responses.callback_ack(&ack_text)
        }
        RelayOutcome::Replied(reply) => state.responses.simple_text(&reply.text),
    };
    Json(response)
}

/// POST /skill/info
pub async fn post_info(State(state): State<GatewayState>) -> Json<SkillResponse> {
    Json(state.responses.simple_text(&state.skills.info_text))
}

/// POST /skill/emergency
pub async fn post_emergency(State(state): State<GatewayState>) -> Json<SkillResponse> {
    Json(state.responses.simple_text(&state.skills.emergency_text))
}

/// GET /health
///
/// Unauthenticated. Reports storage health alongside process uptime.
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    let storage = match state.storage.health_check().await {
        Ok(status) => status,
        Err(e) => HealthStatus::Unhealthy(e.to_string()),
    };
    let storage_detail = match &storage {
        HealthStatus::Healthy => None,
        HealthStatus::Degraded(detail) | HealthStatus::Unhealthy(detail) => Some(detail.clone()),
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
        timestamp: minwon_core::now_rfc3339(),
        storage: storage.label().to_string(),
        storage_detail,
    })
}
