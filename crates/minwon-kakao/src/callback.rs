// SPDX-FileCopyrightText: 2026 Minwon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery of deferred replies to Kakao callback addresses.

use std::time::Duration;

use async_trait::async_trait;
use minwon_config::model::KakaoConfig;
use minwon_core::error::MinwonError;
use minwon_core::traits::{DeliveryAdapter, PluginAdapter};
use minwon_core::types::{AdapterType, HealthStatus, OutboundReply};
use tracing::{debug, info};

use crate::response::ResponseBuilder;

/// Posts finished replies to the one-time callback URL of a skill request.
///
/// A callback address accepts a single POST; there is no retry.
pub struct KakaoCallbackClient {
    client: reqwest::Client,
    responses: ResponseBuilder,
}

impl KakaoCallbackClient {
    pub fn new(config: &KakaoConfig) -> Result<Self, MinwonError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.callback_timeout_secs))
            .build()
            .map_err(|e| MinwonError::Delivery {
                message: format!("failed to build callback HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            responses: ResponseBuilder::new(config),
        })
    }
}

#[async_trait]
impl PluginAdapter for KakaoCallbackClient {
    fn name(&self) -> &str {
        "kakao-callback"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Delivery
    }

    async fn health_check(&self) -> Result<HealthStatus, MinwonError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), MinwonError> {
        debug!("Kakao callback client shutting down");
        Ok(())
    }
}

#[async_trait]
impl DeliveryAdapter for KakaoCallbackClient {
    async fn deliver(&self, callback_url: &str, reply: &OutboundReply) -> Result<(), MinwonError> {
        let body = self.responses.simple_text(&reply.text);
        let response = self
            .client
            .post(callback_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| MinwonError::Delivery {
                message: format!("callback POST failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(MinwonError::Delivery {
                message: format!("callback returned {status}: {text}"),
                source: None,
            });
        }

        info!(status = %status, urgent = reply.is_urgent, "callback delivered");
        Ok(())
    }
}
