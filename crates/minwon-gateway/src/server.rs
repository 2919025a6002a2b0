// SPDX-FileCopyrightText: 2026 Minwon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state.

use std::sync::Arc;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use minwon_config::model::MinwonConfig;
use minwon_core::{MinwonError, StorageAdapter};
use minwon_kakao::ResponseBuilder;
use minwon_relay::Relay;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::admin;
use crate::auth::{AuthConfig, auth_middleware};
use crate::handlers;

/// Process start time for uptime calculation.
#[derive(Clone)]
pub struct HealthState {
    pub start_time: std::time::Instant,
}

/// Fixed texts served by the static skills.
#[derive(Debug, Clone)]
pub struct StaticSkills {
    pub info_text: String,
    pub emergency_text: String,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub relay: Arc<Relay>,
    pub storage: Arc<dyn StorageAdapter>,
    pub responses: ResponseBuilder,
    pub skills: StaticSkills,
    pub auth: AuthConfig,
    pub health: HealthState,
}

impl GatewayState {
    pub fn new(relay: Arc<Relay>, storage: Arc<dyn StorageAdapter>, config: &MinwonConfig) -> Self {
        Self {
            relay,
            storage,
            responses: ResponseBuilder::new(&config.kakao),
            skills: StaticSkills {
                info_text: config.kakao.info_text.clone(),
                emergency_text: config.kakao.emergency_text.clone(),
            },
            auth: AuthConfig {
                bearer_token: config.server.admin_token.clone(),
            },
            health: HealthState {
                start_time: std::time::Instant::now(),
            },
        }
    }
}

/// Builds the full router:
/// - POST /skill/{complaint,info,emergency} (public webhooks)
/// - GET /health (public)
/// - /admin/* (bearer auth)
pub fn router(state: GatewayState) -> Router {
    let auth_state = state.auth.clone();

    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .route("/skill/complaint", post(handlers::post_complaint))
        .route("/skill/info", post(handlers::post_info))
        .route("/skill/emergency", post(handlers::post_emergency))
        .with_state(state.clone());

    let admin_routes = Router::new()
        .route("/admin/logs", get(admin::get_logs))
        .route("/admin/urgent", get(admin::get_urgent))
        .route("/admin/history", get(admin::list_histories))
        .route(
            "/admin/history/{sender_id}",
            get(admin::get_history).delete(admin::delete_history),
        )
        .route("/admin/pause/{sender_id}", post(admin::pause_sender))
        .route("/admin/resume/{sender_id}", post(admin::resume_sender))
        .route("/admin/paused", get(admin::list_paused))
        .route("/admin/jobs", get(admin::list_jobs))
        .route_layer(axum_middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Binds `host:port` and serves until `shutdown` is cancelled.
pub async fn serve(
    host: &str,
    port: u16,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), MinwonError> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| MinwonError::Config(format!("failed to bind {addr}: {e}")))?;

    tracing::info!("minwon listening on {addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| MinwonError::Internal(format!("http server error: {e}")))?;

    tracing::info!("http server stopped");
    Ok(())
}
