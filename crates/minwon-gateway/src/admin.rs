// SPDX-FileCopyrightText: 2026 Minwon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator endpoints under /admin. All routes sit behind the bearer middleware.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;

use minwon_core::types::{ComplaintLogEntry, PausedSender, UserState};
use minwon_relay::JobRecord;

use crate::error::ApiError;
use crate::server::GatewayState;

#[derive(Debug, Serialize)]
pub struct LogListResponse {
    pub total: usize,
    pub logs: Vec<ComplaintLogEntry>,
}

#[derive(Debug, Serialize)]
pub struct HistoryListResponse {
    pub total: usize,
    pub users: Vec<UserState>,
}

#[derive(Debug, Serialize)]
pub struct DeleteHistoryResponse {
    pub sender_id: String,
    pub deleted: u64,
}

/// Result of a pause or resume call. `changed` is false for a repeat call.
#[derive(Debug, Serialize)]
pub struct PauseResponse {
    pub sender_id: String,
    pub paused: bool,
    pub changed: bool,
}

#[derive(Debug, Serialize)]
pub struct PausedListResponse {
    pub total: usize,
    pub senders: Vec<PausedSender>,
}

#[derive(Debug, Serialize)]
pub struct JobListResponse {
    pub total: usize,
    pub in_flight: usize,
    pub jobs: Vec<JobRecord>,
}

/// GET /admin/logs
pub async fn get_logs(State(state): State<GatewayState>) -> Result<Json<LogListResponse>, ApiError> {
    let logs = state.storage.read_log(false).await?;
    Ok(Json(LogListResponse {
        total: logs.len(),
        logs,
    }))
}

/// GET /admin/urgent
pub async fn get_urgent(
    State(state): State<GatewayState>,
) -> Result<Json<LogListResponse>, ApiError> {
    let logs = state.storage.read_log(true).await?;
    Ok(Json(LogListResponse {
        total: logs.len(),
        logs,
    }))
}

/// GET /admin/history
pub async fn list_histories(
    State(state): State<GatewayState>,
) -> Result<Json<HistoryListResponse>, ApiError> {
    let users = state.storage.read_all_histories().await?;
    Ok(Json(HistoryListResponse {
        total: users.len(),
        users,
    }))
}

/// GET /admin/history/{sender_id}
///
/// An unknown sender yields empty turns rather than 404.
pub async fn get_history(
    State(state): State<GatewayState>,
    Path(sender_id): Path<String>,
) -> Result<Json<UserState>, ApiError> {
    let turns = state.storage.read_turns(&sender_id).await?;
    let paused = state.storage.is_paused(&sender_id).await?;
    Ok(Json(UserState {
        sender_id,
        turns,
        paused,
    }))
}

/// DELETE /admin/history/{sender_id}
pub async fn delete_history(
    State(state): State<GatewayState>,
    Path(sender_id): Path<String>,
) -> Result<Json<DeleteHistoryResponse>, ApiError> {
    let deleted = state.storage.delete_turns(&sender_id).await?;
    tracing::info!(sender_id = %sender_id, deleted, "history deleted by operator");
    Ok(Json(DeleteHistoryResponse { sender_id, deleted }))
}

/// POST /admin/pause/{sender_id}
pub async fn pause_sender(
    State(state): State<GatewayState>,
    Path(sender_id): Path<String>,
) -> Result<Json<PauseResponse>, ApiError> {
    set_paused(&state, sender_id, true).await
}

/// POST /admin/resume/{sender_id}
pub async fn resume_sender(
    State(state): State<GatewayState>,
    Path(sender_id): Path<String>,
) -> Result<Json<PauseResponse>, ApiError> {
    set_paused(&state, sender_id, false).await
}

async fn set_paused(
    state: &GatewayState,
    sender_id: String,
    paused: bool,
) -> Result<Json<PauseResponse>, ApiError> {
    let changed = state.storage.set_paused(&sender_id, paused).await?;
    if changed {
        tracing::info!(sender_id = %sender_id, paused, "pause state changed by operator");
    }
    Ok(Json(PauseResponse {
        sender_id,
        paused,
        changed,
    }))
}

/// GET /admin/paused
pub async fn list_paused(
    State(state): State<GatewayState>,
) -> Result<Json<PausedListResponse>, ApiError> {
    let senders = state.storage.list_paused().await?;
    Ok(Json(PausedListResponse {
        total: senders.len(),
        senders,
    }))
}

/// GET /admin/jobs
pub async fn list_jobs(State(state): State<GatewayState>) -> Json<JobListResponse> {
    let dispatcher = state.relay.dispatcher();
    let jobs = dispatcher.jobs();
    Json(JobListResponse {
        total: jobs.len(),
        in_flight: dispatcher.in_flight(),
        jobs,
    })
}
