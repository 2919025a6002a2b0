// SPDX-FileCopyrightText: 2026 Minwon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Best-effort owner alerts for urgent requests.

use std::time::Duration;

use minwon_core::error::MinwonError;
use serde::Serialize;
use tracing::{debug, warn};

const NOTIFY_TIMEOUT: Duration = Duration::from_secs(3);

/// JSON body posted to the owner endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct UrgentAlert {
    pub sender_id: String,
    pub message: String,
    pub reply: String,
    pub timestamp: String,
}

/// Posts an [`UrgentAlert`] to the configured owner endpoint.
///
/// Without an endpoint every call is a no-op. Failures are logged, never
/// returned.
#[derive(Debug, Clone)]
pub struct UrgentNotifier {
    client: reqwest::Client,
    url: Option<String>,
}

impl UrgentNotifier {
    pub fn new(url: Option<String>) -> Result<Self, MinwonError> {
        let client = reqwest::Client::builder()
            .timeout(NOTIFY_TIMEOUT)
            .build()
            .map_err(|e| MinwonError::Delivery {
                message: format!("failed to build notify HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self { client, url })
    }

    /// A notifier that never sends anything.
    pub fn disabled() -> Self {
        Self {
            client: reqwest::Client::new(),
            url: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.url.is_some()
    }

    pub async fn notify(&self, alert: &UrgentAlert) {
        let Some(url) = self.url.as_deref() else {
            return;
        };
        match self.client.post(url).json(alert).send().await {
            Ok(resp) if resp.status().is_success() => {
                debug!(sender_id = %alert.sender_id, "owner notified");
            }
            Ok(resp) => {
                warn!(sender_id = %alert.sender_id, status = %resp.status(), "owner notify rejected");
            }
            Err(e) => {
                warn!(sender_id = %alert.sender_id, error = %e, "owner notify failed");
            }
        }
    }
}
